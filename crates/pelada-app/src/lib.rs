// Application layer: configuration, the Google Sheets client, and reports.

pub mod config;
pub mod http;
pub mod report;
