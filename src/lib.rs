pub mod cli;
pub mod config;
pub mod error;
pub mod jenkins;
pub mod models;
pub mod report;
