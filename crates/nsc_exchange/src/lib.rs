//! NSC Exchange - Clearinghouse File Sync
//!
//! The orchestration layer around [`nsc_engine`]: loads the exchange
//! configuration, drives the receive and send pipelines against the
//! transport collaborator, journals every action, and executes import
//! dispatches.
//!
//! # Core Concepts
//!
//! - **ExchangeConfig**: one immutable, validated configuration object
//! - **Transport**: the narrow contract to the secure transfer channel
//! - **Journal**: append-only CSV, one row per processed file
//! - **Receive/Send**: the two batch pipelines driven from the CLI

pub mod config;
pub mod error;
pub mod import;
pub mod journal;
pub mod receive;
pub mod send;
pub mod transport;

// Re-exports for convenience
pub use config::{ExchangeConfig, FtpConfig, ImportSettings, LocalConfig};
pub use error::{ExchangeError, Result};
pub use journal::{Journal, JournalEntry, Outcome};
pub use receive::{receive_files, ReceiveOptions, ReceiveReport};
pub use send::{send_files, SendReport};
pub use transport::{open_transport, DirTransport, RemoteEntry, Transport};
