use serde::{Deserialize, Serialize};

use crate::domain::ScoreRecord;

/// Multipart field the gateway reads the uploaded screenshot from.
pub const UPLOAD_FIELD: &str = "screenshot";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoresResponse {
    /// The gateway encodes an empty history as `null`.
    #[serde(default)]
    pub scores: Option<Vec<ScoreRecord>>,
}

impl ScoresResponse {
    pub fn into_records(self) -> Vec<ScoreRecord> {
        self.scores.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub scores_found: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateScoreRequest {
    pub scenario: String,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoreId;

    #[test]
    fn null_and_missing_scores_mean_empty_history() {
        let null: ScoresResponse = serde_json::from_str(r#"{"scores":null}"#).expect("null");
        let missing: ScoresResponse = serde_json::from_str("{}").expect("missing");

        assert!(null.into_records().is_empty());
        assert!(missing.into_records().is_empty());
    }

    #[test]
    fn keeps_backend_order() {
        let response: ScoresResponse = serde_json::from_str(
            r#"{"scores":[
                {"ID":2,"scenario":"VT Flickspeed VALORANT","score":825,"processed_at":"2024-01-02T10:00:00Z"},
                {"ID":1,"scenario":"Range 1","score":87,"processed_at":"2024-01-01T10:00:00Z"}
            ]}"#,
        )
        .expect("scores");

        let ids: Vec<ScoreId> = response.into_records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ScoreId(2), ScoreId(1)]);
    }

    #[test]
    fn upload_response_fields_are_optional() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"message":"File processed successfully","scores_found":3}"#)
                .expect("full");
        assert_eq!(response.scores_found, Some(3));

        let bare: UploadResponse = serde_json::from_str("{}").expect("bare");
        assert_eq!(bare.scores_found, None);
        assert_eq!(bare.message, None);
    }
}
