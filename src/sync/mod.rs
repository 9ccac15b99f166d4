pub mod data_source;
pub mod loader;
pub mod realtime;
pub mod rest_client;

pub use data_source::{CalendarDataSource, Session, SourceError};
pub use loader::CalendarLoader;
pub use realtime::{ChannelSubscription, RealtimeTaskList, TaskSubscription, apply_task_update};
pub use rest_client::RestDataSource;
