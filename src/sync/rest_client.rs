use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::records::id::deserialize_id;
use crate::records::{Meeting, PersonalTodo, ProjectTask};
use crate::sync::data_source::{CalendarDataSource, SourceError};

const REST_PREFIX: &str = "rest/v1";

#[derive(Debug, Deserialize)]
struct MembershipRow {
    #[serde(deserialize_with = "deserialize_id")]
    project_id: String,
}

/// Reads calendar rows from the hosted platform's REST interface.
pub struct RestDataSource {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl RestDataSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), REST_PREFIX, table)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let url = self.table_url(table);
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);

        tracing::debug!("GET {} with {:?}", url, query);

        let response = self.client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
            .query(query)
            .send()
            .await?;

        let status = response.status();

        if status == 401 {
            tracing::error!("Authentication failed when reading {}", table);
            return Err(SourceError::AuthenticationFailed);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to read {}. Status: {}, Body: {}", table, status, body);
            return Err(SourceError::RequestError(format!("Status {}: {}", status, body)));
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(decode_rows(table, rows))
    }

    async fn member_project_ids(&self, user_id: &str) -> Result<Vec<String>, SourceError> {
        let rows: Vec<MembershipRow> = self
            .get_rows(
                "project_members",
                &[
                    ("select", "project_id".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|row| row.project_id).collect())
    }

    /// A failed membership lookup counts as no memberships, so the user's own
    /// records are still fetched.
    async fn member_project_ids_or_empty(&self, user_id: &str) -> Vec<String> {
        match self.member_project_ids(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("Failed to look up project memberships for {}: {}", user_id, e);
                Vec::new()
            }
        }
    }
}

// Rows the calendar cannot place (bad timestamps, missing ids) are skipped.
fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<serde_json::Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} row: {}", table, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl CalendarDataSource for RestDataSource {
    async fn fetch_meetings(&self, user_id: &str) -> Result<Vec<Meeting>, SourceError> {
        let project_ids = self.member_project_ids_or_empty(user_id).await;
        // "0" never matches, keeping the filter well formed for users without projects.
        let id_list = if project_ids.is_empty() { "0".to_string() } else { project_ids.join(",") };

        let meetings: Vec<Meeting> = self
            .get_rows(
                "meetings",
                &[
                    ("select", "*,projects(name)".to_string()),
                    ("or", format!("(created_by.eq.{},project_id.in.({}))", user_id, id_list)),
                ],
            )
            .await?;

        tracing::info!("Fetched {} meetings", meetings.len());
        Ok(meetings)
    }

    async fn fetch_personal_todos(&self, user_id: &str) -> Result<Vec<PersonalTodo>, SourceError> {
        let todos: Vec<PersonalTodo> = self
            .get_rows(
                "tasks",
                &[
                    ("select", "*".to_string()),
                    ("user_id", format!("eq.{}", user_id)),
                    ("project_id", "is.null".to_string()),
                ],
            )
            .await?;

        tracing::info!("Fetched {} personal todos", todos.len());
        Ok(todos)
    }

    async fn fetch_project_tasks(&self, user_id: &str) -> Result<Vec<ProjectTask>, SourceError> {
        let project_ids = self.member_project_ids_or_empty(user_id).await;
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tasks: Vec<ProjectTask> = self
            .get_rows(
                "tasks",
                &[
                    ("select", "*,projects(name)".to_string()),
                    ("project_id", format!("in.({})", project_ids.join(","))),
                ],
            )
            .await?;

        tracing::info!("Fetched {} project tasks", tasks.len());
        Ok(tasks)
    }
}
