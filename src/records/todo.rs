use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::records::id::deserialize_id;

const MIN_TITLE_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title must be at least 3 characters.")]
    TitleTooShort,
    #[error("Due date cannot be in the past.")]
    ScheduledInPast,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TitleTooShort => "title",
            ValidationError::ScheduledInPast => "scheduled_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalTodo {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PersonalTodo {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Fields accepted by the create and edit todo actions. A draft without a
/// schedule is placed at the current instant on create and keeps its stored
/// schedule on edit.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            scheduled_at: Some(scheduled_at),
            ..Self::unscheduled(title)
        }
    }

    pub fn unscheduled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            scheduled_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks every field and reports all failures at once. A todo may be
    /// scheduled earlier today, measured in `now`'s time zone.
    pub fn validate<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.title.chars().count() < MIN_TITLE_CHARS {
            errors.push(ValidationError::TitleTooShort);
        }

        if let Some(scheduled_at) = self.scheduled_at {
            let scheduled_day = scheduled_at.with_timezone(&now.timezone()).date_naive();
            if scheduled_day < now.date_naive() {
                errors.push(ValidationError::ScheduledInPast);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn valid_draft_passes() {
        let draft = TodoDraft::new("Buy milk", at(15));
        assert_eq!(draft.validate(&at(12)), Ok(()));
    }

    #[test]
    fn earlier_today_is_still_allowed() {
        let draft = TodoDraft::new("Buy milk", at(8));
        assert!(draft.validate(&at(12)).is_ok());
    }

    #[test]
    fn yesterday_is_rejected() {
        let draft = TodoDraft::new("Buy milk", at(8) - chrono::Duration::days(1));

        let errors = draft.validate(&at(12)).unwrap_err();

        assert_eq!(errors, vec![ValidationError::ScheduledInPast]);
        assert_eq!(errors[0].field(), "scheduled_at");
    }

    #[test]
    fn short_title_and_past_date_are_both_reported() {
        let draft = TodoDraft::new("Hi", at(8) - chrono::Duration::days(3));

        let errors = draft.validate(&at(12)).unwrap_err();

        assert_eq!(
            errors,
            vec![ValidationError::TitleTooShort, ValidationError::ScheduledInPast]
        );
        assert_eq!(errors[0].to_string(), "Title must be at least 3 characters.");
    }

    #[test]
    fn unscheduled_draft_only_checks_title() {
        assert!(TodoDraft::unscheduled("Buy milk").validate(&at(12)).is_ok());
        assert_eq!(
            TodoDraft::unscheduled("Hi").validate(&at(12)),
            Err(vec![ValidationError::TitleTooShort])
        );
    }

    #[test]
    fn start_of_day_follows_callers_time_zone() {
        // 23:30 UTC on the 9th is already the 10th at UTC+2.
        let draft = TodoDraft::new("Late call", at(0) - chrono::Duration::minutes(30));
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = at(12).with_timezone(&offset);

        assert!(draft.validate(&now).is_ok());
        assert!(draft.validate(&at(12)).is_err());
    }

    #[test]
    fn decodes_row_with_defaults() {
        let row = json!({
            "id": 12,
            "title": "Buy milk",
            "scheduled_at": "2024-01-10T08:00:00Z",
            "user_id": "u1"
        });

        let todo: PersonalTodo = serde_json::from_value(row).unwrap();

        assert_eq!(todo.id, "12");
        assert!(!todo.completed);
        assert!(todo.is_owned_by("u1"));
        assert!(todo.created_at.is_none());
    }
}
