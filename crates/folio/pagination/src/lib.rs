//! Folio keyset pagination.
//!
//! Category listings page through the membership relation
//! `(object_id, term_taxonomy_id)` ordered by object id descending, then
//! taxonomy id ascending. A page request is a pure function of its inputs:
//! the position to resume from travels with the client as an opaque cursor
//! token, so concurrent requests for any page of any listing need no shared
//! state.
//!
//! `has_next_page` comes from a lookahead row (fetch `page_size + 1`, emit
//! `page_size`) instead of a separate count query.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod cursor;
mod error;
mod key;
mod paginator;
mod query;

pub use cursor::{decode_cursor, encode_cursor, CURSOR_DELIMITER};
pub use error::{PageError, PageResult};
pub use key::MembershipKey;
pub use paginator::{KeysetPaginator, Page};
pub use query::{MembershipQuery, MembershipSource, Visibility};
