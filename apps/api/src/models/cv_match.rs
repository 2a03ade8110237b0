use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted outcome of screening one uploaded CV against one job.
/// Unique on (job_id, file_name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvMatchRow {
    pub id: i64,
    pub job_id: String,
    pub file_name: String,
    pub extracted_skills: Vec<String>,
    pub match_score: i32,
    pub match_status: String,
    pub extracted_text: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Insert parameters for a new match record.
#[derive(Debug, Clone)]
pub struct NewCvMatch {
    pub job_id: String,
    pub file_name: String,
    pub extracted_skills: Vec<String>,
    pub match_score: u8,
    pub match_status: MatchStatus,
    pub extracted_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    NotMatched,
}

impl MatchStatus {
    /// Scores at or above this are `matched`.
    pub const MATCHED_THRESHOLD: u8 = 80;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::MATCHED_THRESHOLD {
            MatchStatus::Matched
        } else {
            MatchStatus::NotMatched
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::NotMatched => "not_matched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundary_is_80() {
        assert_eq!(MatchStatus::from_score(80), MatchStatus::Matched);
        assert_eq!(MatchStatus::from_score(79), MatchStatus::NotMatched);
        assert_eq!(MatchStatus::from_score(100), MatchStatus::Matched);
        assert_eq!(MatchStatus::from_score(0), MatchStatus::NotMatched);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&MatchStatus::NotMatched).unwrap();
        assert_eq!(json, r#""not_matched""#);
        assert_eq!(MatchStatus::NotMatched.as_str(), "not_matched");
    }
}
