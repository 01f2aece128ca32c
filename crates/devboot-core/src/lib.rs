pub mod config;
pub mod error;
pub mod observability;
pub mod profile;
