use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Fields;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "submission_id")]
    pub token: Token,
    #[sqlx(json)]
    pub primary_payload: Fields,
    pub secondary_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
