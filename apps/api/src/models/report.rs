use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker the model writes into template fields it could not determine.
pub const PLACEHOLDER: &str = "[Angabe fehlt]";

/// A finalized report as persisted by the report store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: String,
    pub formal: String,
    pub date: DateTime<Utc>,
}
