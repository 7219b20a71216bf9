//! JSON document codec for the store file.
//!
//! A store file is one JSON object:
//!
//! ```json
//! {
//!   "format": "ticklist",
//!   "version": 1,
//!   "saved_at": "2026-10-16T12:00:00Z",
//!   "items": [{ "text": "buy milk", "completed": true }]
//! }
//! ```
//!
//! Decoding is all-or-nothing: a caller either gets the full item list or an
//! error, never a prefix of it.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::model::item::TodoItem;

/// Format marker written into every document.
pub const FORMAT_MARKER: &str = "ticklist";

/// Newest document version this build reads and the one it writes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct DocumentOut<'a> {
    format: &'static str,
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [TodoItem],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentIn {
    format: String,
    version: u32,
    #[serde(default)]
    #[allow(dead_code)]
    saved_at: Option<DateTime<Utc>>,
    items: Vec<TodoItem>,
}

/// Encode `items` as a pretty-printed document with a trailing newline.
///
/// # Errors
///
/// Returns [`PersistenceError::Encode`] if serialization fails.
pub fn encode(items: &[TodoItem], saved_at: DateTime<Utc>) -> Result<Vec<u8>, PersistenceError> {
    let doc = DocumentOut {
        format: FORMAT_MARKER,
        version: FORMAT_VERSION,
        saved_at,
        items,
    };
    let mut bytes = serde_json::to_vec_pretty(&doc).map_err(PersistenceError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode a document read from `path`.
///
/// `path` is only used to label errors.
///
/// # Errors
///
/// - [`PersistenceError::Corrupt`] for empty input, invalid JSON, or a
///   document of the wrong shape.
/// - [`PersistenceError::Foreign`] when the format marker is not `ticklist`.
/// - [`PersistenceError::UnsupportedVersion`] for a version newer than
///   [`FORMAT_VERSION`].
pub fn decode(bytes: &[u8], path: &Path) -> Result<Vec<TodoItem>, PersistenceError> {
    let doc: DocumentIn =
        serde_json::from_slice(bytes).map_err(|source| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    if doc.format != FORMAT_MARKER {
        return Err(PersistenceError::Foreign {
            path: path.to_path_buf(),
            found: doc.format,
        });
    }

    if doc.version > FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: doc.version,
            supported: FORMAT_VERSION,
        });
    }

    Ok(doc.items)
}
