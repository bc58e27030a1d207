pub mod admin;
pub mod app;
pub mod app_config;
pub mod cli;
pub mod error;
mod native;
pub mod outcome;
pub mod request;

pub use admin::{alter_topic_config, AdminSession};
pub use app_config::AppConfig;
pub use error::{AlterError, AlterResult, ProtocolError};
pub use request::ConfigChangeRequest;
