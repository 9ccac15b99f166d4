pub mod id;
pub mod meeting;
pub mod project;
pub mod task;
pub mod todo;

pub use meeting::{Meeting, MeetingDraft};
pub use project::{Project, ProjectRef};
pub use task::{ProjectTask, TaskStatus};
pub use todo::{PersonalTodo, TodoDraft, ValidationError};
