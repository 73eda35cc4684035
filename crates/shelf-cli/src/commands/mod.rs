//! Command handlers for non-interactive use

pub mod book;
pub mod config;
