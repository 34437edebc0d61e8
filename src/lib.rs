pub mod config;
pub mod error;
pub mod files;
pub mod sanitize;
pub mod store;
pub mod terminal;
pub mod tmux;
pub mod utils;
pub mod web;
