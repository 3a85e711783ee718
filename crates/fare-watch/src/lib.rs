pub mod alerts;
pub mod config;
pub mod error;
pub mod mail;
pub mod pricing;
pub mod store;
pub mod telemetry;
