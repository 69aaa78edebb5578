//! Resource abstraction layer
//!
//! This module gives a data-driven, name-keyed view of the NahCloud entity
//! kinds on top of the typed client in [`crate::nah`].
//!
//! # Architecture
//!
//! - [`registry`] - Loads resource definitions (fields, defaults, parent
//!   scoping, replace-forcing fields) from embedded JSON
//! - [`dispatch`] - Maps `(resource type, verb, target, JSON params)` onto
//!   concrete client calls
//!
//! # Example
//!
//! ```no_run
//! use nahcloud::resource::{execute, Target, Verb};
//! use nahcloud::NahClient;
//! use serde_json::json;
//!
//! async fn upload(client: &NahClient) -> nahcloud::Result<serde_json::Value> {
//!     execute(
//!         client,
//!         "nah_object",
//!         Verb::Create,
//!         &Target::new().with_parent("b1"),
//!         &json!({"path": "/a.txt", "content": "aGVsbG8="}),
//!     )
//!     .await
//! }
//! ```

pub mod dispatch;
mod registry;

pub use dispatch::{execute, Target, Verb};
pub use registry::*;
