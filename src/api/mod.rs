pub mod attendance;
pub mod daily_report;
pub mod settings;
