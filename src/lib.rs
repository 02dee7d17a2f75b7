//! Bulkline: Asynchronous Command Bulk Dispatch
//!
//! An embeddable library that ingests byte-oriented command streams through a
//! handle-based API, batches commands into bulks by fixed count or by nested
//! brace-delimited dynamic regions, and fans each completed bulk out to a
//! synchronous console echo and an asynchronously written log file, with a
//! `wait` barrier draining all outstanding writes.

pub mod accumulator;
pub mod api;
pub mod assembler;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod sink;
pub mod types;

pub use api::{connect, disconnect, receive, wait, DispatchStats, Dispatcher};
pub use config::DispatcherConfig;
pub use error::{ConfigError, RegistryError};
pub use registry::Handle;
pub use types::{Bulk, ContextId, Sequence};
