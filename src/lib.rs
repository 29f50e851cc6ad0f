pub mod analytics;
pub mod config;
pub mod data;
pub mod notify;
pub mod pipeline;
pub mod report;
