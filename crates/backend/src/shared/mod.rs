pub mod config;
pub mod data;
pub mod logger;
pub mod notifications;
