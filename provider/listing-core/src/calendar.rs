use serde::{Deserialize, Serialize};

use crate::stable_hash;

/// Calendar event arguments. Times are ISO 8601 local date-times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventRequest {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Identifier of a created calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarEventHandle(pub String);

impl std::fmt::Display for CalendarEventHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mock calendar insert.
pub fn handle(req: &CalendarEventRequest) -> CalendarEventHandle {
    let hash = stable_hash(&[&req.summary, &req.start_time, &req.end_time]);
    CalendarEventHandle(format!("evt_{:08x}", hash))
}
