//! Lifecycle records and tri-state milestone dates.

use crate::metadata::ReleaseCycle;
use failure::{format_err, Fail, Fallible};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle records for each os-release identifier.
pub type LifecycleMap = std::collections::BTreeMap<String, Vec<LifecycleRecord>>;

/// Status of a lifecycle milestone.
///
/// `evaluated` tells whether the milestone applies (or has been reached),
/// `until` carries its date when one is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalDate {
    pub evaluated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum DecodeError {
    #[fail(display = "unexpected {} value for milestone '{}'", kind, field)]
    UnexpectedType {
        field: &'static str,
        kind: &'static str,
    },
}

impl ConditionalDate {
    /// Decode a raw milestone value.
    ///
    /// `null` (or a missing key) means the milestone is absent, booleans
    /// map to undated status and strings to a dated one.
    pub fn decode(field: &'static str, raw: &Value) -> Result<Option<Self>, DecodeError> {
        let date = match raw {
            Value::Null => return Ok(None),
            Value::Bool(evaluated) => Self {
                evaluated: *evaluated,
                until: None,
            },
            Value::String(until) => Self {
                evaluated: true,
                until: Some(until.clone()),
            },
            Value::Number(_) => return Err(DecodeError::UnexpectedType { field, kind: "number" }),
            Value::Array(_) => return Err(DecodeError::UnexpectedType { field, kind: "array" }),
            Value::Object(_) => return Err(DecodeError::UnexpectedType { field, kind: "object" }),
        };
        Ok(Some(date))
    }
}

/// Lifecycle data for one release cycle of a distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleRecord {
    /// Identifier queried at the provider.
    pub api_id: String,
    /// Original os-release identifier.
    pub os_release_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lts: Option<ConditionalDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eol: Option<ConditionalDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<ConditionalDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_support: Option<ConditionalDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discontinued: Option<ConditionalDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl LifecycleRecord {
    /// Build a record from a provider release cycle, tagged with both identifiers.
    pub fn from_cycle(
        cycle: ReleaseCycle,
        os_release_id: &str,
        api_id: &str,
    ) -> Result<Self, DecodeError> {
        let record = Self {
            api_id: api_id.to_string(),
            os_release_id: os_release_id.to_string(),
            cycle: non_empty(cycle.cycle),
            codename: non_empty(cycle.codename),
            lts: ConditionalDate::decode("lts", &cycle.lts)?,
            release_date: non_empty(cycle.release_date),
            eol: ConditionalDate::decode("eol", &cycle.eol)?,
            latest: non_empty(cycle.latest),
            latest_release_date: non_empty(cycle.latest_release_date),
            support: ConditionalDate::decode("support", &cycle.support)?,
            extended_support: ConditionalDate::decode("extendedSupport", &cycle.extended_support)?,
            discontinued: ConditionalDate::decode("discontinued", &cycle.discontinued)?,
            link: non_empty(cycle.link),
        };
        Ok(record)
    }
}

/// Decode a provider payload (a JSON array of release cycles).
pub fn decode_cycles(
    payload: &[u8],
    os_release_id: &str,
    api_id: &str,
) -> Fallible<Vec<LifecycleRecord>> {
    let cycles: Vec<ReleaseCycle> = serde_json::from_slice(payload)
        .map_err(|e| format_err!("malformed lifecycle payload for {}: {}", api_id, e))?;

    cycles
        .into_iter()
        .enumerate()
        .map(|(index, cycle)| {
            LifecycleRecord::from_cycle(cycle, os_release_id, api_id).map_err(|e| {
                format_err!("failed to decode cycle #{} for {}: {}", index, api_id, e)
            })
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
