pub mod api;
pub mod chat;
pub mod completeness;
pub mod error;
pub mod fixtures;
pub mod monitor;
pub mod report;
pub mod server;
pub mod services;
pub mod state;
pub mod types;
pub mod validation;
