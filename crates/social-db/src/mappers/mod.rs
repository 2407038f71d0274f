//! Entity to model mappers
//!
//! - `From<Model> for Entity` (or `TryFrom` where a row can be malformed)
//! - `*Columns` structs: entity data flattened for binding

mod comment;
mod connection;
mod content;
mod hashtag;
mod user;

pub use content::ContentColumns;
pub(crate) use content::content_type_filter;
