use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::ProjectRef;
use crate::records::id::{deserialize_id, deserialize_optional_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub project_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub created_by: String,
    #[serde(default, rename = "projects")]
    pub project: Option<ProjectRef>,
}

impl Meeting {
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Input of the scheduling action. Start/end ordering is left to the form.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub project_id: Option<String>,
}

impl MeetingDraft {
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_time,
            end_time,
            project_id: None,
        }
    }

    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn decodes_row_with_joined_project() {
        let row = json!({
            "id": "m1",
            "title": "Standup",
            "start_time": "2024-01-10T09:00:00Z",
            "end_time": "2024-01-10T09:30:00+00:00",
            "project_id": 3,
            "created_by": "u1",
            "projects": { "name": "Core" }
        });

        let meeting: Meeting = serde_json::from_value(row).unwrap();

        assert_eq!(meeting.id, "m1");
        assert_eq!(meeting.project_id.as_deref(), Some("3"));
        assert_eq!(meeting.project_name(), Some("Core"));
        assert_eq!(meeting.start_time, Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap());
        assert_eq!(meeting.duration_minutes(), 30);
    }

    #[test]
    fn decodes_row_without_project() {
        let row = json!({
            "id": 5,
            "title": "1:1",
            "description": null,
            "start_time": "2024-01-10T09:00:00Z",
            "end_time": "2024-01-10T10:00:00Z",
            "project_id": null,
            "created_by": "u1",
            "projects": null
        });

        let meeting: Meeting = serde_json::from_value(row).unwrap();

        assert_eq!(meeting.id, "5");
        assert!(meeting.project_id.is_none());
        assert!(meeting.project_name().is_none());
    }

    #[test]
    fn row_with_naive_timestamp_is_rejected() {
        let row = json!({
            "id": "m1",
            "title": "Standup",
            "start_time": "not a time",
            "end_time": "2024-01-10T09:30:00Z",
            "created_by": "u1"
        });

        assert!(serde_json::from_value::<Meeting>(row).is_err());
    }

    #[test]
    fn draft_builder_sets_optional_fields() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let draft = MeetingDraft::new("Review", start, start + chrono::Duration::minutes(45))
            .in_project("p1")
            .with_description("Quarterly");

        assert_eq!(draft.project_id.as_deref(), Some("p1"));
        assert_eq!(draft.description.as_deref(), Some("Quarterly"));
    }
}
