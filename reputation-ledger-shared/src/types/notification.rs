use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::types::UserId;

pub type NotificationId = Uuid;

/// Classes of events a user can opt out of being notified about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EventClass {
    /// A comment was posted on the user's content.
    Comment,
    /// An answer was added to the user's question.
    Answer,
    /// A vote was cast on the user's content.
    Vote,
}

impl EventClass {
    /// Key under which the preference flag is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventClass::Comment => "comment",
            EventClass::Answer => "answer",
            EventClass::Vote => "vote",
        }
    }
}

impl fmt::Display for EventClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(EventClass::Comment),
            "answer" => Ok(EventClass::Answer),
            "vote" => Ok(EventClass::Vote),
            other => Err(other.to_string()),
        }
    }
}

/// A per-account map of notification opt-ins.
///
/// Classes without an explicit flag are enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPreferences(HashMap<EventClass, bool>);

impl NotificationPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allows(&self, event_class: EventClass) -> bool {
        self.0.get(&event_class).copied().unwrap_or(true)
    }

    pub fn set(&mut self, event_class: EventClass, enabled: bool) {
        self.0.insert(event_class, enabled);
    }
}

/// A notification to be created; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub event_class: EventClass,
    pub message: String,
    pub link: String,
}

/// A stored notification addressed to one recipient.
///
/// `is_read` only ever moves from `false` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub event_class: EventClass,
    pub message: String,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
