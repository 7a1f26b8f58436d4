//! Source resolution: turns a user selection into media bytes.
//!
//! A selected local file is used as-is. Otherwise a pasted link is fetched
//! over HTTP(S) and named after its last path segment. When both are present
//! the file wins.

mod config;
mod error;
mod fetcher;
mod resolver;
mod types;

pub use config::SourceConfig;
pub use error::InputError;
pub use fetcher::{FetchedMedia, HttpFetcher, MediaFetcher};
pub use resolver::{derive_file_name, SourceResolver};
pub use types::{
    content_type_essence, content_type_for_name, InputOrigin, LocalFile, MediaInput, Selection,
    DEFAULT_CONTENT_TYPE, DEFAULT_EXTENSION, DEFAULT_FILE_NAME,
};
