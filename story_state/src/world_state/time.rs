//! Wall-clock timestamps carried in the narrative state.
//!
//! Timestamps serialize as a tagged object, `{"$timestamp": "<RFC 3339>"}`,
//! so a saved state never confuses them with ordinary strings.

use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TAG: &str = "$timestamp";

/// A UTC instant with a tagged serde representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Tagged {
    #[serde(rename = "$timestamp")]
    value: String,
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Tagged {
            value: self.0.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tagged = Tagged::deserialize(deserializer)
            .map_err(|e| D::Error::custom(format!("expected {{\"{TAG}\": ...}}: {e}")))?;
        DateTime::parse_from_rfc3339(&tagged.value)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(D::Error::custom)
    }
}
