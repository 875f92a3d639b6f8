use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a host collaborator (installer, catalog, settings store).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{message}")]
    Message {
        message: String,
        details: Option<String>,
    },
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Message { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Message { details, .. } => details.as_deref(),
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AddonId(pub String);

impl AddonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AddonId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AddonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifies one upgrade batch in logs and reports.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed interval of absolute instants during which unattended upgrades may run.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MaintenanceWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl MaintenanceWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, HostError> {
        if start > end {
            return Err(HostError::with_details(
                "maintenance window ends before it starts",
                format!("start={start} end={end}"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both boundaries are inside the window.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.start && now <= self.end
    }
}

impl fmt::Display for MaintenanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolicyDecision {
    Permitted,
    NotAllowed,
    Blocked,
}

/// Allow/block lists restricting which add-ons may be upgraded unattended.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpgradePolicy {
    pub allowed: BTreeSet<AddonId>,
    pub blocked: BTreeSet<AddonId>,
}

impl UpgradePolicy {
    pub fn new<A, B>(allowed: A, blocked: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<AddonId>,
        B: IntoIterator,
        B::Item: Into<AddonId>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            blocked: blocked.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty() && self.blocked.is_empty()
    }

    /// An empty allow-list restricts nothing. The block-list is consulted after
    /// the allow-list, so an id present in both ends up blocked.
    pub fn decide(&self, id: &AddonId) -> PolicyDecision {
        if !self.allowed.is_empty() && !self.allowed.contains(id) {
            return PolicyDecision::NotAllowed;
        }
        if !self.blocked.is_empty() && self.blocked.contains(id) {
            return PolicyDecision::Blocked;
        }
        PolicyDecision::Permitted
    }
}
