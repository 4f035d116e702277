use std::sync::Arc;

use chrono::NaiveDate;
use futures::try_join;
use tracing::{error, info, instrument, warn};

use crate::model::daily_tally::DailyTally;
use crate::report::aggregator::{aggregate, day_bounds};
use crate::report::builder::{CardMessage, build_card};
use crate::report::notifier::{NotifyError, Notifier};
use crate::report::policy::CutoffPolicy;
use crate::report::store::ReportStore;

/// Terminal state of one daily report run.
#[derive(Debug)]
pub enum JobOutcome {
    /// Report switched off in the system config. Not an error.
    Disabled,
    /// Missing destination group, missing push credential or missing config row.
    ConfigError { message: String },
    Delivered { tally: DailyTally },
    /// The push API answered with a non-success status.
    DeliveryError { tally: DailyTally, error: String },
    /// Store or transport failure anywhere in the pipeline.
    InternalError { error: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Disabled | JobOutcome::Delivered { .. })
    }
}

/// Tally and rendered card for a day, without delivery.
#[derive(Debug)]
pub struct ReportPreview {
    pub tally: DailyTally,
    /// `None` when no destination group is configured.
    pub card: Option<CardMessage>,
}

/// Fetch, aggregate, render and deliver the attendance report for one day.
///
/// Runs are independent: nothing is persisted between them and a failed run
/// is simply triggered again from the start.
pub struct DailyReportJob {
    store: Arc<dyn ReportStore>,
    notifier: Arc<dyn Notifier>,
    policy: CutoffPolicy,
}

impl DailyReportJob {
    pub fn new(store: Arc<dyn ReportStore>, notifier: Arc<dyn Notifier>, policy: CutoffPolicy) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    async fn tally_for(&self, date: NaiveDate) -> anyhow::Result<DailyTally> {
        let (start, end) = day_bounds(date);
        let (employees, records) = try_join!(
            self.store.list_employees(),
            self.store.attendance_between(start, end)
        )?;
        info!(
            employees = employees.len(),
            records = records.len(),
            "Attendance data fetched"
        );
        Ok(aggregate(&employees, &records, &self.policy))
    }

    #[instrument(name = "daily_report", skip_all, fields(%date))]
    pub async fn run(&self, date: NaiveDate) -> JobOutcome {
        let system_config = match self.store.load_system_config().await {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!("System config row is missing");
                return JobOutcome::ConfigError {
                    message: "System config not found".to_string(),
                };
            }
            Err(e) => {
                error!(error = ?e, "Failed to read system config");
                return JobOutcome::InternalError {
                    error: e.to_string(),
                };
            }
        };

        if !system_config.enable_daily_report {
            info!("Daily report disabled, nothing sent");
            return JobOutcome::Disabled;
        }

        let Some(group_id) = system_config.group_id() else {
            warn!("Daily report enabled but no admin group configured");
            return JobOutcome::ConfigError {
                message: "Admin group id is not configured".to_string(),
            };
        };

        let tally = match self.tally_for(date).await {
            Ok(t) => t,
            Err(e) => {
                error!(error = ?e, "Failed to build daily tally");
                return JobOutcome::InternalError {
                    error: e.to_string(),
                };
            }
        };

        if tally.skipped > 0 {
            warn!(skipped = tally.skipped, "Some employees were left out of the tally");
        }

        let card = build_card(date, &tally, group_id);

        match self.notifier.send(&card).await {
            Ok(()) => {
                info!(?tally, "Daily report delivered");
                JobOutcome::Delivered { tally }
            }
            Err(NotifyError::MissingCredential) => {
                warn!("Push API token missing, report not sent");
                JobOutcome::ConfigError {
                    message: NotifyError::MissingCredential.to_string(),
                }
            }
            Err(NotifyError::Rejected { status, body }) => {
                error!(%status, body = %body, "Push API rejected daily report");
                JobOutcome::DeliveryError { tally, error: body }
            }
            Err(e @ NotifyError::Transport(_)) => {
                error!(error = %e, "Push API unreachable");
                JobOutcome::InternalError {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Computes the report for `date` without sending it or checking the enable switch.
    pub async fn preview(&self, date: NaiveDate) -> anyhow::Result<ReportPreview> {
        let system_config = self.store.load_system_config().await?;
        let tally = self.tally_for(date).await?;
        let card = system_config
            .as_ref()
            .and_then(|c| c.group_id())
            .map(|group_id| build_card(date, &tally, group_id));
        Ok(ReportPreview { tally, card })
    }
}
