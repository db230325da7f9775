//! Cursor token text format.
//!
//! `<object_id>//<term_taxonomy_id>`: each field in canonical decimal,
//! percent-escaped. Clients hold these tokens across requests, so the format
//! must stay decodable.

use crate::{MembershipKey, PageError, PageResult};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const CURSOR_DELIMITER: &str = "//";

/// Characters left unescaped, matching URI component escaping.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Render the cursor token that resumes after `key`.
pub fn encode_cursor(key: &MembershipKey) -> String {
    [key.object_id, key.term_taxonomy_id]
        .iter()
        .map(|part| utf8_percent_encode(&part.to_string(), COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join(CURSOR_DELIMITER)
}

/// Parse a client-supplied cursor token.
pub fn decode_cursor(token: &str) -> PageResult<MembershipKey> {
    let parts: Vec<&str> = token.split(CURSOR_DELIMITER).collect();
    let [object_id, term_taxonomy_id] = parts.as_slice() else {
        return Err(PageError::invalid_cursor(
            token,
            format!("expected 2 fields, found {}", parts.len()),
        ));
    };

    Ok(MembershipKey::new(
        decode_field(token, object_id)?,
        decode_field(token, term_taxonomy_id)?,
    ))
}

fn decode_field(token: &str, field: &str) -> PageResult<u64> {
    let text = percent_decode_str(field)
        .decode_utf8()
        .map_err(|e| PageError::invalid_cursor(token, format!("field is not utf-8: {e}")))?;

    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text.len() == 1 || !text.starts_with('0'));
    if !canonical {
        return Err(PageError::invalid_cursor(
            token,
            format!("'{text}' is not a canonical decimal integer"),
        ));
    }

    text.parse::<u64>()
        .map_err(|e| PageError::invalid_cursor(token, e.to_string()))
}
