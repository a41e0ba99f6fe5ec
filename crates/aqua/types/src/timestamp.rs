use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;

const FORMAT: &str = "%Y%m%d%H%M%S";

/// Revision creation time, fixed-width `YYYYMMDDHHmmss` in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalTimestamp(NaiveDateTime);

impl LocalTimestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        // Sub-second precision is not representable on the wire.
        let seconds = at.timestamp();
        let truncated = DateTime::from_timestamp(seconds, 0).unwrap_or(at);
        Self(truncated.naive_utc())
    }

    pub fn parse(input: &str) -> Result<Self, TreeError> {
        if input.len() != 14 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(input));
        }
        NaiveDateTime::parse_from_str(input, FORMAT)
            .map(Self)
            .map_err(|_| malformed(input))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}

fn malformed(input: &str) -> TreeError {
    TreeError::MalformedRevision {
        field: "local_timestamp".to_string(),
        reason: format!("expected YYYYMMDDHHmmss, got {input:?}"),
    }
}

impl fmt::Display for LocalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for LocalTimestamp {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LocalTimestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LocalTimestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
