use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an account, as issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Document identifier of a content item, unique within its `ContentType`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kinds of content that can receive votes.
///
/// The discriminants are the codes persisted in the `content_type` columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Note = 0,
    Question = 1,
    Answer = 2,
    Comment = 3,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Note => "note",
            ContentType::Question => "question",
            ContentType::Answer => "answer",
            ContentType::Comment => "comment",
        }
    }
}

impl TryFrom<i16> for ContentType {
    type Error = i16;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ContentType::Note),
            1 => Ok(ContentType::Question),
            2 => Ok(ContentType::Answer),
            3 => Ok(ContentType::Comment),
            other => Err(other),
        }
    }
}

impl From<ContentType> for i16 {
    fn from(content_type: ContentType) -> Self {
        content_type as i16
    }
}

/// Reference to a single votable content item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentRef {
    pub content_type: ContentType,
    pub content_id: ContentId,
}

impl ContentRef {
    pub fn new(content_type: ContentType, content_id: impl Into<String>) -> Self {
        Self {
            content_type,
            content_id: ContentId::new(content_id),
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.content_type.as_str(), self.content_id)
    }
}
