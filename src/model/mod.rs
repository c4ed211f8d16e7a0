pub mod employee;
pub mod role;
pub mod settings;
pub mod site;
pub mod time_log;
