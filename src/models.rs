use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the challenge; also the ceiling on "add" for a single user.
pub const CHALLENGE_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub listening: u8,
    pub reading: u8,
    pub writing: f64,
    pub day: u32,
}

/// Fields written on create and update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreFields {
    pub listening: u8,
    pub reading: u8,
    pub writing: f64,
}

/// Payload of a new document; `day` and the owner are set once and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewScore {
    pub owner_id: String,
    pub fields: ScoreFields,
    pub day: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub identity: Identity,
    pub friend_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct AggregateStats {
    pub avg_listening: f64,
    pub avg_reading: f64,
    pub avg_writing: f64,
    pub total: usize,
}

/// Raw entry form contents. An empty string means the field was left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreDraft {
    #[serde(default)]
    pub listening: String,
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub writing: String,
}

impl ScoreDraft {
    pub fn from_record(record: &ScoreRecord) -> Self {
        Self {
            listening: record.listening.to_string(),
            reading: record.reading.to_string(),
            writing: if record.writing > 0.0 {
                record.writing.to_string()
            } else {
                String::new()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedScore {
    pub fields: ScoreFields,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Own,
    Friend,
    Compare,
}

impl ViewMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "own" | "my" => Some(Self::Own),
            "friend" => Some(Self::Friend),
            "compare" => Some(Self::Compare),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Friend => "friend",
            Self::Compare => "compare",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub mode: ViewMode,
}
