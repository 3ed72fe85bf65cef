use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ScoreId);

/// One processed result as returned by the score-query backend.
///
/// The gateway serializes the identifier as `ID`; `id` is accepted too so
/// that either casing deserializes into the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: ScoreId,
    pub scenario: String,
    pub score: i64,
    pub processed_at: DateTime<Utc>,
}
