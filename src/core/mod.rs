pub mod auth;
pub mod config;
pub mod fetcher;
pub mod formatter;
pub mod models;
pub mod monitoring;
pub mod registry;
