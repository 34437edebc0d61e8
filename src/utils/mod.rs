pub mod command_log;
pub mod path_utils;
