use async_trait::async_trait;
use thiserror::Error;

use crate::records::{Meeting, PersonalTodo, ProjectTask};
use crate::storage::local_store::StoreError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Local store error: {0}")]
    StoreError(#[from] StoreError),
}

/// The signed-in user whose visibility scope is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into() }
    }
}

/// Scoped reads behind the calendar.
///
/// - meetings created by the user or attached to a project the user belongs to
/// - tasks owned by the user that have no project
/// - tasks of every project the user belongs to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarDataSource: Send + Sync {
    async fn fetch_meetings(&self, user_id: &str) -> Result<Vec<Meeting>, SourceError>;

    async fn fetch_personal_todos(&self, user_id: &str) -> Result<Vec<PersonalTodo>, SourceError>;

    async fn fetch_project_tasks(&self, user_id: &str) -> Result<Vec<ProjectTask>, SourceError>;
}

#[async_trait]
impl<T: CalendarDataSource + ?Sized> CalendarDataSource for Box<T> {
    async fn fetch_meetings(&self, user_id: &str) -> Result<Vec<Meeting>, SourceError> {
        (**self).fetch_meetings(user_id).await
    }

    async fn fetch_personal_todos(&self, user_id: &str) -> Result<Vec<PersonalTodo>, SourceError> {
        (**self).fetch_personal_todos(user_id).await
    }

    async fn fetch_project_tasks(&self, user_id: &str) -> Result<Vec<ProjectTask>, SourceError> {
        (**self).fetch_project_tasks(user_id).await
    }
}
