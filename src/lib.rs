pub mod app;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod lists;
pub mod session;
pub mod settings;
pub mod store;
