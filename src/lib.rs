pub mod config;
pub mod error;
pub mod models;
pub mod prompt;
pub mod services;
