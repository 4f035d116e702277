use chrono::{NaiveDateTime, NaiveTime};

/// Business rule deciding whether a check-in counts as late.
pub trait LatenessPolicy {
    fn is_late(&self, check_in: NaiveDateTime) -> bool;
}

/// Late when the check-in wall-clock time is strictly after `cutoff`.
#[derive(Debug, Clone, Copy)]
pub struct CutoffPolicy {
    pub cutoff: NaiveTime,
}

impl CutoffPolicy {
    pub fn new(cutoff: NaiveTime) -> Self {
        Self { cutoff }
    }
}

impl LatenessPolicy for CutoffPolicy {
    fn is_late(&self, check_in: NaiveDateTime) -> bool {
        check_in.time() > self.cutoff
    }
}
