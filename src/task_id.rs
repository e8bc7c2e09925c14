use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task identifier: 20 lowercase hex characters.
///
/// The first 12 characters are the creation time in milliseconds since the
/// Unix epoch, the last 8 are random. Lexicographic order therefore follows
/// creation order at millisecond granularity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub const HEX_LEN: usize = 20;

    /// Generate a fresh task ID stamped with the current time.
    pub fn generate() -> std::result::Result<Self, TaskIdGenerationError> {
        Self::generate_with(Utc::now().timestamp_millis(), |bytes| {
            getrandom::fill(bytes).map_err(TaskIdGenerationError::random_source)
        })
    }

    /// Test hook: inject the clock reading and random bytes.
    pub(crate) fn generate_with<F>(
        millis: i64,
        mut fill_random: F,
    ) -> std::result::Result<Self, TaskIdGenerationError>
    where
        F: FnMut(&mut [u8]) -> std::result::Result<(), TaskIdGenerationError>,
    {
        if !(0..=0xffff_ffff_ffff).contains(&millis) {
            return Err(TaskIdGenerationError::ClockOutOfRange(millis));
        }
        let mut bytes = [0_u8; 4];
        fill_random(&mut bytes)?;
        Ok(Self(format!(
            "{millis:012x}{:08x}",
            u32::from_be_bytes(bytes)
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_and_normalize(value: &str) -> Result<String, TaskIdParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TaskIdParseError::Empty);
        }
        if trimmed.len() != Self::HEX_LEN {
            return Err(TaskIdParseError::InvalidLength(trimmed.len()));
        }
        if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TaskIdParseError::InvalidCharacter);
        }

        Ok(trimmed.to_ascii_lowercase())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Self::validate_and_normalize(s)?))
    }
}

impl ToSql for TaskId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(bytes) => {
                let text =
                    std::str::from_utf8(bytes).map_err(|e| FromSqlError::Other(Box::new(e)))?;
                text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIdGenerationError {
    RandomSource(String),
    ClockOutOfRange(i64),
}

impl TaskIdGenerationError {
    fn random_source(error: impl fmt::Display) -> Self {
        Self::RandomSource(error.to_string())
    }
}

impl fmt::Display for TaskIdGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomSource(message) => write!(f, "task id generation failed: {message}"),
            Self::ClockOutOfRange(millis) => {
                write!(f, "task id generation failed: clock reading {millis} out of range")
            }
        }
    }
}

impl std::error::Error for TaskIdGenerationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIdParseError {
    Empty,
    InvalidLength(usize),
    InvalidCharacter,
}

impl fmt::Display for TaskIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "task id cannot be empty"),
            Self::InvalidLength(actual) => write!(
                f,
                "task id must be exactly {} hex characters (got {})",
                TaskId::HEX_LEN,
                actual
            ),
            Self::InvalidCharacter => {
                write!(
                    f,
                    "task id must contain only ASCII hex characters (0-9, a-f)"
                )
            }
        }
    }
}

impl std::error::Error for TaskIdParseError {}
