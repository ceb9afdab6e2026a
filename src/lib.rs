//! cardtrail - record every Trello card list move in a local file and a Google Sheet.
//!
//! Board data is read through a staleness cache ([`cache`]), reduced to
//! [`movement::MovementRecord`]s and merged idempotently into each sink.

pub mod cache;
pub mod config;
pub mod logging;
pub mod movement;
pub mod sink;
pub mod sync;
pub mod trello;
