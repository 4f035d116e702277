//! Daily attendance report: a pure aggregation core (`aggregator`, `builder`,
//! `policy`) wrapped by an I/O shell (`store`, `notifier`, `job`).

pub mod aggregator;
pub mod builder;
pub mod job;
pub mod notifier;
pub mod policy;
pub mod store;
