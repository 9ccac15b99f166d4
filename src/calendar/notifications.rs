use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::records::PersonalTodo;

const UPCOMING_WINDOW_HOURS: i64 = 4;
const RECENTLY_COMPLETED_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notifications {
    pub upcoming: Vec<PersonalTodo>,
    pub recently_completed: Vec<PersonalTodo>,
}

impl Notifications {
    /// Open todos due within the next four hours, soonest first, and the
    /// five most recently created completed todos.
    pub fn collect(todos: &[PersonalTodo], now: DateTime<Utc>) -> Self {
        let window_end = now + Duration::hours(UPCOMING_WINDOW_HOURS);

        let mut upcoming: Vec<PersonalTodo> = todos
            .iter()
            .filter(|t| !t.completed && t.scheduled_at >= now && t.scheduled_at <= window_end)
            .cloned()
            .collect();
        upcoming.sort_by_key(|t| t.scheduled_at);

        let mut recently_completed: Vec<PersonalTodo> =
            todos.iter().filter(|t| t.completed).cloned().collect();
        recently_completed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recently_completed.truncate(RECENTLY_COMPLETED_LIMIT);

        Self {
            upcoming,
            recently_completed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.recently_completed.is_empty()
    }
}
