pub mod auth;
pub mod complaints;
pub mod notifications;
pub mod preferences;
