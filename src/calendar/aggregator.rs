use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarEvent, EventSource, SourceKind};
use crate::records::{Meeting, PersonalTodo, ProjectTask};

/// Todos and tasks carry one instant; they are drawn as blocks of this length.
pub const SINGLE_INSTANT_DURATION_MS: i64 = 3_600_000;

const COMPLETED_SUFFIX: &str = " (Completed)";

/// The three record sets visible to one user, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarData {
    pub meetings: Vec<Meeting>,
    pub todos: Vec<PersonalTodo>,
    pub project_tasks: Vec<ProjectTask>,
}

impl CalendarData {
    pub fn is_empty(&self) -> bool {
        self.meetings.is_empty() && self.todos.is_empty() && self.project_tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.meetings.len() + self.todos.len() + self.project_tasks.len()
    }
}

/// Merges the three sources into one event list: meetings, then todos, then
/// tasks, each kept in input order. Sorting is left to the caller.
pub fn aggregate(
    meetings: &[Meeting],
    todos: &[PersonalTodo],
    tasks: &[ProjectTask],
) -> Vec<CalendarEvent> {
    let mut events = Vec::with_capacity(meetings.len() + todos.len() + tasks.len());
    events.extend(meetings.iter().map(meeting_event));
    events.extend(todos.iter().map(todo_event));
    events.extend(tasks.iter().map(task_event));

    tracing::debug!(
        "Aggregated {} meetings, {} todos, {} tasks into {} events",
        meetings.len(),
        todos.len(),
        tasks.len(),
        events.len()
    );
    events
}

pub fn aggregate_data(data: &CalendarData) -> Vec<CalendarEvent> {
    aggregate(&data.meetings, &data.todos, &data.project_tasks)
}

pub fn meeting_event(meeting: &Meeting) -> CalendarEvent {
    CalendarEvent {
        id: SourceKind::Meeting.event_id(&meeting.id),
        title: compose_title(SourceKind::Meeting, &meeting.title, meeting.project_name(), false),
        start: meeting.start_time,
        end: meeting.end_time,
        source: EventSource::Meeting(meeting.clone()),
    }
}

pub fn todo_event(todo: &PersonalTodo) -> CalendarEvent {
    CalendarEvent {
        id: SourceKind::Todo.event_id(&todo.id),
        title: compose_title(SourceKind::Todo, &todo.title, None, todo.completed),
        start: todo.scheduled_at,
        end: single_instant_end(todo.scheduled_at),
        source: EventSource::Todo(todo.clone()),
    }
}

pub fn task_event(task: &ProjectTask) -> CalendarEvent {
    let start = task.anchor();
    CalendarEvent {
        id: SourceKind::Task.event_id(&task.id),
        title: compose_title(SourceKind::Task, &task.title, task.project_name(), task.is_completed()),
        start,
        end: single_instant_end(start),
        source: EventSource::Task(task.clone()),
    }
}

fn compose_title(kind: SourceKind, title: &str, project: Option<&str>, completed: bool) -> String {
    let mut composed = format!("{} {}", kind.title_prefix(), title);
    if let Some(name) = project {
        composed.push_str(&format!(" ({})", name));
    }
    if completed {
        composed.push_str(COMPLETED_SUFFIX);
    }
    composed
}

fn single_instant_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_add_signed(Duration::milliseconds(SINGLE_INSTANT_DURATION_MS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
