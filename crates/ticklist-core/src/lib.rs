//! ticklist-core library.
//!
//! The [`store::TodoStore`] owns an ordered list of [`model::item::TodoItem`]s
//! and persists it as a single JSON document.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::StoreError`]; configuration
//!   loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod codec;
pub mod config;
pub mod error;
pub mod lock;
pub mod markdown;
pub mod model;
pub mod persist;
pub mod stats;
pub mod store;

pub use error::{ErrorCode, PersistenceError, StoreError};
pub use model::item::{Status, TodoItem};
pub use store::TodoStore;
