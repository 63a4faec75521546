//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - init: schema initialization and corpus reset
//! - ingest: bulk dataset ingestion
//! - query: retrieval-only and full RAG chat commands
//! - info: statistics and configuration display

pub mod info;
pub mod ingest;
pub mod init;
pub mod query;

pub use info::*;
pub use ingest::*;
pub use init::*;
pub use query::*;
