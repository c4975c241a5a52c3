pub mod api_connection;
pub mod app;
pub mod cli;
pub mod config;
pub mod diet;
pub mod history;
pub mod prompt_builder;
