pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod layout;
pub mod output;
pub mod server;
pub mod services;
pub mod sources;
pub mod storage;
pub mod templates;
