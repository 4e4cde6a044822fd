//! Keyboard Status Monitor Library
//!
//! This library provides the core of key-mon: the modmap that turns raw
//! scan codes into symbolic key identifiers, the input device sources, the
//! event log, and the single-threaded loop that keeps the pressed-key
//! indicator up to date.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod device;
pub mod event_log;
pub mod modmap;
pub mod monitor;
