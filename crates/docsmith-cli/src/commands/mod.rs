//! Command handlers

pub mod config;
pub mod edit;
pub mod export;
pub mod reset;
pub mod shell;
pub mod status;
pub mod templates;
