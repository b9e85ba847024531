//! Command-line front end for the taskdeck client library.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
mod output;
