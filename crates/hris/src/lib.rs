pub mod config;
pub mod directory;
pub mod error;
pub mod ids;
pub mod notifications;
pub mod telemetry;
pub mod workflows;
