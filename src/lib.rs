//! Watches an apartment listing page and reports what changed since the last
//! look.
//!
//! The pipeline is [`parser`] → [`diff`] → [`notify`], with [`stats`] for
//! reporting and [`storage`] holding the snapshot between runs. [`monitor`]
//! ties one cycle together.

pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod parser;
pub mod scrapers;
pub mod stats;
pub mod storage;

pub use error::{Result, WatchError};
