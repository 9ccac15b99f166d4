use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Meeting,
    Todo,
    Task,
}

/// Per-kind display attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    pub color: &'static str,
    pub title_prefix: &'static str,
    pub id_prefix: &'static str,
}

const MEETING_STYLE: KindStyle = KindStyle {
    color: "#3b82f6",
    title_prefix: "📅",
    id_prefix: "meeting",
};

const TODO_STYLE: KindStyle = KindStyle {
    color: "#10b981",
    title_prefix: "✅",
    id_prefix: "todo",
};

const TASK_STYLE: KindStyle = KindStyle {
    color: "#f59e0b",
    title_prefix: "📋",
    id_prefix: "task",
};

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Meeting, SourceKind::Todo, SourceKind::Task];

    pub fn style(self) -> &'static KindStyle {
        match self {
            SourceKind::Meeting => &MEETING_STYLE,
            SourceKind::Todo => &TODO_STYLE,
            SourceKind::Task => &TASK_STYLE,
        }
    }

    pub fn color(self) -> &'static str {
        self.style().color
    }

    pub fn title_prefix(self) -> &'static str {
        self.style().title_prefix
    }

    pub fn event_id(self, source_id: &str) -> String {
        format!("{}-{}", self.style().id_prefix, source_id)
    }

    /// Color token per kind, in display order.
    pub fn legend() -> [(SourceKind, &'static str); 3] {
        Self::ALL.map(|kind| (kind, kind.color()))
    }

    pub fn event_style(self) -> EventStyle {
        EventStyle {
            background_color: self.color(),
            ..EventStyle::base()
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.style().id_prefix)
    }
}

/// Block style handed to the rendering surface. Only the background varies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventStyle {
    pub background_color: &'static str,
    pub text_color: &'static str,
    pub opacity: f32,
    pub border_radius_px: u8,
}

impl EventStyle {
    fn base() -> Self {
        Self {
            background_color: "#3174ad",
            text_color: "white",
            opacity: 0.8,
            border_radius_px: 5,
        }
    }
}
