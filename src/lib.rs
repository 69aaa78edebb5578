//! Client for the NahCloud API.
//!
//! [`nah`] holds the REST client itself. [`resource`] maps the five entity
//! kinds onto resource type names and dispatches name-keyed calls with JSON
//! parameters onto the typed client, for orchestration adapters and the `nah`
//! command-line tool. [`config`] is the command-line tool's settings file.

pub mod config;
pub mod nah;
pub mod resource;

pub use nah::{ClientConfig, Error, NahClient, Result};
