//! Stored document row

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One stored document as returned by the backing engine.
///
/// `creation_date` is set once on insert; `last_updated_date` moves on
/// every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub key: Option<String>,
    pub data: Value,
    pub creation_date: NaiveDateTime,
    pub last_updated_date: NaiveDateTime,
}
