use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::daily_tally::DailyTally;
use crate::model::employee::Employee;
use crate::report::policy::LatenessPolicy;

/// Daily status of a single employee. Exactly one per processed employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Present,
    Late,
    Leave,
    Absent,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("check-in record {record_id} has no timestamp")]
    MissingTimestamp { record_id: u64 },
}

/// Inclusive bounds of `day`: 00:00:00.000 to 23:59:59.999.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    // 23:59:59.999 is always representable
    let end = day.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN));
    (start, end)
}

/// Groups the day's records by employee id, keeping the input order within a group.
pub fn group_by_employee(records: &[AttendanceRecord]) -> HashMap<u64, Vec<&AttendanceRecord>> {
    let mut grouped: HashMap<u64, Vec<&AttendanceRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.employee_id).or_default().push(record);
    }
    grouped
}

/// Leave wins over check-in; the earliest check-in is late or present; otherwise absent.
///
/// A check-in without a timestamp sorts first and fails the employee.
pub fn classify(
    records: &[&AttendanceRecord],
    policy: &impl LatenessPolicy,
) -> Result<Classification, ClassifyError> {
    if records.iter().any(|r| r.kind() == AttendanceStatus::Leave) {
        return Ok(Classification::Leave);
    }

    match records
        .iter()
        .filter(|r| r.kind() == AttendanceStatus::CheckIn)
        .min_by_key(|r| (r.date, r.id))
    {
        Some(check_in) => {
            let at = check_in.date.ok_or(ClassifyError::MissingTimestamp {
                record_id: check_in.id,
            })?;
            if policy.is_late(at) {
                Ok(Classification::Late)
            } else {
                Ok(Classification::Present)
            }
        }
        None => Ok(Classification::Absent),
    }
}

/// Tallies one calendar day over the whole roster.
///
/// Employees without records are counted absent. An employee whose records
/// cannot be classified is logged and left out of every counter except `total`.
pub fn aggregate(
    roster: &[Employee],
    records: &[AttendanceRecord],
    policy: &impl LatenessPolicy,
) -> DailyTally {
    let grouped = group_by_employee(records);
    let mut tally = DailyTally {
        total: roster.len(),
        ..DailyTally::default()
    };

    for employee in roster {
        let own = grouped.get(&employee.id).map(Vec::as_slice).unwrap_or(&[]);

        match classify(own, policy) {
            Ok(classification) => {
                debug!(employee_id = employee.id, ?classification, "Employee classified");
                match classification {
                    Classification::Leave => tally.leave += 1,
                    Classification::Late => {
                        tally.late += 1;
                        tally.present += 1;
                    }
                    Classification::Present => tally.present += 1,
                    Classification::Absent => tally.absent += 1,
                }
            }
            Err(e) => {
                warn!(employee_id = employee.id, error = %e, "Skipping employee in daily tally");
                tally.skipped += 1;
            }
        }
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::policy::CutoffPolicy;

    fn policy() -> CutoffPolicy {
        CutoffPolicy::new(NaiveTime::from_hms_opt(8, 30, 0).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    fn roster(names: &[&str]) -> Vec<Employee> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Employee {
                id: i as u64 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    fn record(id: u64, employee_id: u64, status: &str, at: Option<(u32, u32)>) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id,
            status: status.to_string(),
            date: at.map(|(h, m)| day().and_hms_opt(h, m, 0).unwrap()),
            note: None,
        }
    }

    fn expected(total: usize, present: usize, late: usize, leave: usize, absent: usize) -> DailyTally {
        DailyTally {
            total,
            present,
            late,
            leave,
            absent,
            skipped: 0,
        }
    }

    #[test]
    fn test_on_time_leave_and_absent() {
        let employees = roster(&["A", "B", "C"]);
        let records = vec![
            record(1, 1, "check_in", Some((8, 0))),
            record(2, 2, "leave", Some((0, 0))),
        ];
        let tally = aggregate(&employees, &records, &policy());
        assert_eq!(tally, expected(3, 1, 0, 1, 1));
    }

    #[test]
    fn test_late_counts_as_present() {
        let employees = roster(&["A", "B", "C"]);
        let records = vec![record(1, 1, "check_in", Some((9, 15)))];
        let tally = aggregate(&employees, &records, &policy());
        assert_eq!(tally, expected(3, 1, 1, 0, 2));
    }

    #[test]
    fn test_leave_beats_check_in() {
        let employees = roster(&["A"]);
        let records = vec![
            record(1, 1, "check_in", Some((8, 5))),
            record(2, 1, "leave", Some((10, 0))),
        ];
        let grouped = group_by_employee(&records);
        assert_eq!(classify(&grouped[&1], &policy()), Ok(Classification::Leave));
        assert_eq!(aggregate(&employees, &records, &policy()), expected(1, 0, 0, 1, 0));
    }

    #[test]
    fn test_no_records_is_absent() {
        assert_eq!(classify(&[], &policy()), Ok(Classification::Absent));

        let employees = roster(&["A", "B"]);
        let tally = aggregate(&employees, &[], &policy());
        assert_eq!(tally, expected(2, 0, 0, 0, 2));
    }

    #[test]
    fn test_other_statuses_do_not_count_as_attendance() {
        let employees = roster(&["A"]);
        let records = vec![record(1, 1, "check_out", Some((17, 0))), record(2, 1, "overtime", None)];
        assert_eq!(aggregate(&employees, &records, &policy()), expected(1, 0, 0, 0, 1));
    }

    #[test]
    fn test_first_check_in_decides_lateness() {
        let employees = roster(&["A"]);
        let records = vec![
            record(1, 1, "check_in", Some((8, 10))),
            record(2, 1, "check_in", Some((13, 0))),
        ];
        assert_eq!(aggregate(&employees, &records, &policy()), expected(1, 1, 0, 0, 0));
    }

    #[test]
    fn test_earliest_check_in_wins_regardless_of_order() {
        let employees = roster(&["A"]);
        // afternoon check-in listed first
        let records = vec![
            record(7, 1, "check_in", Some((13, 0))),
            record(3, 1, "check_in", Some((8, 10))),
        ];
        let own: Vec<&AttendanceRecord> = records.iter().collect();
        assert_eq!(classify(&own, &policy()), Ok(Classification::Present));
        assert_eq!(aggregate(&employees, &records, &policy()), expected(1, 1, 0, 0, 0));
    }

    #[test]
    fn test_records_for_unknown_employees_are_ignored() {
        let employees = roster(&["A"]);
        let records = vec![record(1, 99, "check_in", Some((8, 0)))];
        assert_eq!(aggregate(&employees, &records, &policy()), expected(1, 0, 0, 0, 1));
    }

    #[test]
    fn test_malformed_record_skips_only_that_employee() {
        let employees = roster(&["A", "B", "C"]);
        let records = vec![
            record(1, 1, "check_in", None),
            record(2, 2, "check_in", Some((8, 0))),
        ];
        let tally = aggregate(&employees, &records, &policy());
        assert_eq!(tally.total, 3);
        assert_eq!(tally.present, 1);
        assert_eq!(tally.absent, 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.present + tally.leave + tally.absent + tally.skipped, tally.total);
    }

    #[test]
    fn test_categories_cover_roster() {
        let employees = roster(&["A", "B", "C", "D", "E", "F"]);
        let records = vec![
            record(1, 1, "check_in", Some((7, 55))),
            record(2, 2, "check_in", Some((8, 45))),
            record(3, 3, "leave", None),
            record(4, 4, "leave", None),
            record(5, 4, "check_in", Some((9, 0))),
            record(6, 5, "check_out", Some((18, 0))),
        ];
        let tally = aggregate(&employees, &records, &policy());
        assert_eq!(tally.present + tally.leave + tally.absent, tally.total);
        assert!(tally.late <= tally.present);
        assert_eq!(tally, expected(6, 2, 1, 2, 2));
    }

    #[test]
    fn test_day_bounds() {
        let (start, end) = day_bounds(day());
        assert_eq!(start, day().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end, day().and_hms_milli_opt(23, 59, 59, 999).unwrap());
    }
}
