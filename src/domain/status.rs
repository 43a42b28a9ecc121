use serde::{Deserialize, Serialize};
use std::fmt;

/// The machine name of a payment status, such as `payment_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusKind(String);

impl StatusKind {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StatusKind {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One entry of the status catalog.
///
/// A definition without a parent is a root of the status forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: StatusKind,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: Option<StatusKind>,
}

impl StatusDefinition {
    pub fn new(id: &str, label: &str, parent: Option<&str>) -> Self {
        Self {
            id: StatusKind::new(id),
            label: label.to_string(),
            description: String::new(),
            parent: parent.map(StatusKind::new),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A status a payment was put in at a point in time.
///
/// Instances are never modified once appended to a payment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInstance {
    pub kind: StatusKind,
    /// Seconds since the Unix epoch.
    pub created: u64,
    pub payment_id: Option<u64>,
    pub id: u64,
}
