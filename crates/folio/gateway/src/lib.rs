//! Folio gateway library
//!
//! This crate wires the Folio building blocks into the read-side content
//! gateway:
//! - configuration loading and validation
//! - the load-once shared context (id codecs, merge table, categories)
//! - the content service that resolves articles, authors and images
//! - advert link and media URL shaping
//! - tracing setup for the `foliod` binary

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod context;
pub mod error;
pub mod links;
pub mod model;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::GatewayConfig;
pub use context::{Category, CategoryCatalog, GatewayContext};
pub use error::{GatewayError, GatewayResult};
pub use links::{rewrite_media_url, tracking_link, TrackingParams};
pub use model::{Article, ArticlesEdge, Author, Image};
pub use service::ContentService;
pub use store::open_store;
