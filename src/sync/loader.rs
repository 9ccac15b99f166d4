use chrono::{DateTime, Utc};

use crate::calendar::{CalendarData, CalendarEvent, Notifications, aggregate_data};
use crate::sync::data_source::{CalendarDataSource, Session, SourceError};

/// Fetches a user's calendar inputs once per call. A source that fails
/// contributes nothing instead of failing the whole load.
pub struct CalendarLoader<D> {
    source: D,
}

impl<D: CalendarDataSource> CalendarLoader<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }

    pub async fn load(&self, session: Option<&Session>) -> CalendarData {
        let Some(session) = session else {
            tracing::warn!("No signed-in user, returning an empty calendar");
            return CalendarData::default();
        };
        let user_id = session.user_id.as_str();

        let (meetings, todos, project_tasks) = tokio::join!(
            self.source.fetch_meetings(user_id),
            self.source.fetch_personal_todos(user_id),
            self.source.fetch_project_tasks(user_id),
        );

        let data = CalendarData {
            meetings: or_empty("meetings", meetings),
            todos: or_empty("todos", todos),
            project_tasks: or_empty("project tasks", project_tasks),
        };
        tracing::info!("Loaded {} calendar records for user {}", data.len(), user_id);
        data
    }

    pub async fn load_events(&self, session: Option<&Session>) -> Vec<CalendarEvent> {
        aggregate_data(&self.load(session).await)
    }

    pub async fn load_notifications(&self, session: Option<&Session>, now: DateTime<Utc>) -> Notifications {
        let Some(session) = session else {
            tracing::warn!("No signed-in user, no notifications");
            return Notifications::default();
        };
        let todos = or_empty("todos", self.source.fetch_personal_todos(&session.user_id).await);
        Notifications::collect(&todos, now)
    }
}

fn or_empty<T>(source: &str, result: Result<Vec<T>, SourceError>) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", source, e);
            Vec::new()
        }
    }
}
