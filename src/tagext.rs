//! Main module for tagext library functionality

pub mod config;
pub mod environment;
pub mod error;
pub mod extensions;
pub mod finalize;
pub mod host;
pub mod runtime;
pub mod testing;
