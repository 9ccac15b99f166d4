use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::SourceKind;
use crate::records::{Meeting, PersonalTodo, ProjectTask};

/// Record a calendar event was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum EventSource {
    Meeting(Meeting),
    Todo(PersonalTodo),
    Task(ProjectTask),
}

impl EventSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            EventSource::Meeting(_) => SourceKind::Meeting,
            EventSource::Todo(_) => SourceKind::Todo,
            EventSource::Task(_) => SourceKind::Task,
        }
    }

    pub fn source_id(&self) -> &str {
        match self {
            EventSource::Meeting(meeting) => &meeting.id,
            EventSource::Todo(todo) => &todo.id,
            EventSource::Task(task) => &task.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "resource")]
    pub source: EventSource,
}

impl CalendarEvent {
    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    pub fn color(&self) -> &'static str {
        self.kind().color()
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &CalendarEvent) -> bool {
        self.start < other.end && other.start < self.end
    }
}
