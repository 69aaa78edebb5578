//! NahCloud API interaction module
//!
//! This module provides the REST client for the NahCloud API: typed records,
//! request payloads, error classification and one operation per
//! (entity, verb) pair.
//!
//! # Module Structure
//!
//! - [`client`] - Main client, configuration and URL building
//! - [`http`] - HTTP plumbing: auth header, JSON bodies, status handling, cancellation
//! - [`error`] - Error taxonomy (transport / API / encode / decode)
//! - [`types`] - Entity records and create/update payloads
//! - `projects`, `instances`, `metadata`, `buckets`, `objects` - per-entity operations
//!
//! # Example
//!
//! ```no_run
//! use nahcloud::nah::{NahClient, UpdateMetadataRequest};
//!
//! async fn example() -> nahcloud::nah::Result<()> {
//!     let client = NahClient::new("http://localhost:8080", Some("secret"))?;
//!     let entry = client.create_metadata("app/mode", "blue").await?;
//!     let entry = client
//!         .update_metadata(&entry.id, &UpdateMetadataRequest::new().value("green"))
//!         .await?;
//!     assert_eq!(entry.path, "app/mode");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod types;

mod buckets;
mod instances;
mod metadata;
mod objects;
mod projects;

pub use client::{ClientConfig, NahClient, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use http::DEFAULT_TIMEOUT;
pub use types::*;
