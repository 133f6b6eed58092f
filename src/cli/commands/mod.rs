//! CLI Commands

pub mod config;
pub mod report;
pub mod reset;
pub mod resume;
pub mod run;
pub mod status;
