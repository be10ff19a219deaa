pub mod config;
pub mod output;
pub mod scoring;
pub mod telemetry;
pub mod vendor;
