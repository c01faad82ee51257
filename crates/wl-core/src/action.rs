//! Action enum as the single source of truth for action strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions an agent can log.
///
/// Unknown strings are preserved in [`Action::Other`] so they can flow through
/// every view untouched. They never take part in pairing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Complete,
    ReviewPass,
    TestPass,
    ReviewFail,
    TestFail,
    Error,
    Decision,
    FileCreate,
    FileModify,
    Blocked,
    Unblocked,
    Other(String),
}

/// Whether a terminal action closed its unit of work successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// The role an action plays when reconstructing intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRole {
    /// Opens a unit of work.
    Start,
    /// Closes a unit of work.
    Terminal(Outcome),
    /// Happens inside a unit of work without opening or closing it.
    Marker,
    /// Unknown action, ignored by pairing.
    Inert,
}

impl Action {
    /// Every known action, in display order.
    pub const KNOWN: [Self; 12] = [
        Self::Start,
        Self::Complete,
        Self::ReviewPass,
        Self::TestPass,
        Self::ReviewFail,
        Self::TestFail,
        Self::Error,
        Self::Decision,
        Self::FileCreate,
        Self::FileModify,
        Self::Blocked,
        Self::Unblocked,
    ];

    /// Parses an action string. Never fails: unknown values become [`Action::Other`].
    pub fn parse(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Other(s.to_string()))
    }

    /// The wire representation of this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "START",
            Self::Complete => "COMPLETE",
            Self::ReviewPass => "REVIEW_PASS",
            Self::TestPass => "TEST_PASS",
            Self::ReviewFail => "REVIEW_FAIL",
            Self::TestFail => "TEST_FAIL",
            Self::Error => "ERROR",
            Self::Decision => "DECISION",
            Self::FileCreate => "FILE_CREATE",
            Self::FileModify => "FILE_MODIFY",
            Self::Blocked => "BLOCKED",
            Self::Unblocked => "UNBLOCKED",
            Self::Other(s) => s,
        }
    }

    pub const fn role(&self) -> ActionRole {
        match self {
            Self::Start => ActionRole::Start,
            Self::Complete | Self::ReviewPass | Self::TestPass => {
                ActionRole::Terminal(Outcome::Success)
            }
            Self::ReviewFail | Self::TestFail | Self::Error => {
                ActionRole::Terminal(Outcome::Failure)
            }
            Self::Decision
            | Self::FileCreate
            | Self::FileModify
            | Self::Blocked
            | Self::Unblocked => ActionRole::Marker,
            Self::Other(_) => ActionRole::Inert,
        }
    }

    /// Returns the outcome if this is a terminal action.
    pub const fn outcome(&self) -> Option<Outcome> {
        match self.role() {
            ActionRole::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}
