pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod radar;
pub mod table;
pub mod teammate_impact;
