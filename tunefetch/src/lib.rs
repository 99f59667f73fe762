//! YouTube audio downloader: URL validation, persistent settings, and an
//! interactive download session on top of `tunefetch-dl`.

pub mod check;
pub mod cli;
pub mod config;
pub mod dl;
pub mod files;
pub mod info;
pub mod logging;
pub mod models;
pub mod options;
pub mod prompt;
pub mod retrieval;
pub mod settings;
pub mod validator;
