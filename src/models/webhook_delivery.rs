use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One webhook invocation as seen by the diagnostic sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub received_at: DateTime<Utc>,
    pub raw_body: String,
    pub payload: Option<serde_json::Value>,
    pub query_params: BTreeMap<String, String>,
    pub submission_id: Option<String>,
    pub source: Option<String>,
    pub outcome: String,
    pub status_code: u16,
    pub detail: Option<String>,
}
