pub mod calendar;
pub mod records;
pub mod storage;
pub mod sync;

pub use calendar::{CalendarData, CalendarEvent, EventSource, SourceKind, aggregate};
pub use records::{Meeting, PersonalTodo, ProjectTask, TaskStatus};
