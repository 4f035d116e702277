use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-day attendance counts. Computed on every run, never stored.
///
/// `present` already includes `late`, so for a fully processed roster
/// `present + leave + absent == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "total": 3, "present": 1, "late": 0, "leave": 1, "absent": 1 }))]
pub struct DailyTally {
    pub total: usize,
    pub present: usize,
    pub late: usize,
    pub leave: usize,
    pub absent: usize,
    /// Employees dropped because their records could not be classified.
    #[serde(skip)]
    pub skipped: usize,
}
