pub mod aggregator;
pub mod event;
pub mod notifications;
pub mod source_kind;

pub use aggregator::{CalendarData, aggregate, aggregate_data};
pub use event::{CalendarEvent, EventSource};
pub use notifications::Notifications;
pub use source_kind::{EventStyle, KindStyle, SourceKind};
