//! Folio content store contracts.
//!
//! This crate defines the read-side storage surface the gateway needs from
//! the publication's relational content store:
//! - category memberships for keyset pagination
//! - posts (articles) and their visibility attributes
//! - author accounts and user meta (bios)
//! - post meta and attachments (featured images)
//!
//! Design stance:
//! - The relational store (MySQL, WordPress schema) is the source of truth.
//! - Every read applies the same visibility predicate as pagination.
//! - There is no write surface; the in-memory backend is seeded for tests
//!   and local development only.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
mod model;
mod traits;

pub use error::{StorageError, StorageResult};
pub use model::{AttachmentRecord, AuthorRecord, MetaEntry, PostRecord};
pub use traits::{ArticleStore, AuthorStore, ContentStore, MediaStore, PostScope};

/// Post meta key pointing at a post's featured image attachment.
pub const THUMBNAIL_META_KEY: &str = "_thumbnail_id";
/// Post meta key holding an attachment's alt text.
pub const ATTACHMENT_ALT_META_KEY: &str = "_wp_attachment_image_alt";
/// User meta key holding an author's biography.
pub const AUTHOR_BIO_META_KEY: &str = "description";
