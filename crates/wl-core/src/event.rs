//! Workflow events as read from the activity log.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionRole, Outcome};
use crate::requirements::expand_requirement;

/// One line of the activity log.
///
/// Only `log_seq`, `timestamp`, `agent` and `action` are required. Every other
/// field falls back to an empty value when it is missing or has the wrong shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique, monotonically increasing sequence number. Authoritative for ordering.
    pub log_seq: i64,
    /// Batch or session label.
    #[serde(default, deserialize_with = "lenient::string")]
    pub work_seq: String,
    /// ISO-8601 wall-clock time.
    #[serde(deserialize_with = "lenient::required_string")]
    pub timestamp: String,
    #[serde(deserialize_with = "lenient::required_string")]
    pub agent: String,
    #[serde(deserialize_with = "lenient::required_action")]
    pub action: Action,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phase: String,
    /// Causally prior event, if any.
    #[serde(
        default,
        deserialize_with = "lenient::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_log_seq: Option<i64>,
    /// Requirement identifiers, possibly in `X-001 through X-005` shorthand.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub requirements: Vec<String>,
    /// Fine-grained correlation key. Empty strings are treated as absent.
    #[serde(
        default,
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub decisions: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub errors: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub files_created: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub files_modified: Vec<String>,
    /// Author-supplied duration. Never derived.
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<f64>,
}

impl Event {
    /// Creates an event with the required fields and empty optional fields.
    pub fn new(
        log_seq: i64,
        timestamp: impl Into<String>,
        agent: impl Into<String>,
        action: impl Into<Action>,
    ) -> Self {
        Self {
            log_seq,
            work_seq: String::new(),
            timestamp: timestamp.into(),
            agent: agent.into(),
            action: action.into(),
            phase: String::new(),
            parent_log_seq: None,
            requirements: Vec::new(),
            task_id: None,
            details: String::new(),
            decisions: Vec::new(),
            errors: Vec::new(),
            files_created: Vec::new(),
            files_modified: Vec::new(),
            duration_ms: None,
        }
    }

    #[must_use]
    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    #[must_use]
    pub fn with_work_seq(mut self, work_seq: impl Into<String>) -> Self {
        self.work_seq = work_seq.into();
        self
    }

    #[must_use]
    pub const fn with_parent(mut self, parent_log_seq: i64) -> Self {
        self.parent_log_seq = Some(parent_log_seq);
        self
    }

    #[must_use]
    pub fn with_requirements<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements = requirements.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_files_created<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_created = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_files_modified<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_modified = paths.into_iter().map(Into::into).collect();
        self
    }

    pub const fn role(&self) -> ActionRole {
        self.action.role()
    }

    pub const fn outcome(&self) -> Option<Outcome> {
        self.action.outcome()
    }

    /// Requirement identifiers with range shorthand expanded, in field order.
    pub fn expanded_requirements(&self) -> impl Iterator<Item = String> + '_ {
        self.requirements
            .iter()
            .flat_map(|requirement| expand_requirement(requirement))
    }

    /// Returns true if the event created or modified `path`.
    pub fn touches_file(&self, path: &str) -> bool {
        self.files_created
            .iter()
            .chain(&self.files_modified)
            .any(|p| p == path)
    }
}

/// Field deserializers that fall back to an empty value instead of failing.
mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::action::Action;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Any non-null value, scalars rendered as text. Only null is rejected.
    pub fn required_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Err(D::Error::custom("required field is null")),
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    pub fn required_action<'de, D: Deserializer<'de>>(d: D) -> Result<Action, D::Error> {
        required_string(d).map(|s| Action::parse(&s))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(d)?).filter(|s| !s.is_empty()))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Value::deserialize(d)?.as_i64())
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(d)?.as_f64())
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }
}
