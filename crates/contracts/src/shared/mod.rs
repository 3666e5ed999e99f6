pub mod logger;
pub mod notifications;
