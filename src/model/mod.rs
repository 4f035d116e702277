pub mod attendance;
pub mod daily_tally;
pub mod employee;
pub mod role;
pub mod system_config;
