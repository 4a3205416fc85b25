//! Decoders for Pocket's form-encoded OAuth responses.
//!
//! Without an `X-Accept: application/json` header Pocket answers the OAuth
//! endpoints with `key=value` pairs. Each response shape gets its own decoder
//! so a format change shows up as a single typed error.

use url::form_urlencoded;

use crate::{AccessGrant, PocketError, Result};

/// Decode the token request response (`code=<token>`).
///
/// Only the value of the first pair is used; the key name is not checked.
pub fn decode_request_token(body: &str) -> Result<String> {
    let body = body.trim();
    form_urlencoded::parse(body.as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            PocketError::MalformedResponse(format!("expected key=value request token, got {body:?}"))
        })
}

/// Decode the exchange response (`access_token=<token>&username=<name>`).
///
/// The first pair's value is the access token and the second pair's value is
/// the username. Anything with fewer than two pairs means the user never
/// approved the request token.
pub fn decode_access_grant(body: &str) -> Result<AccessGrant> {
    let body = body.trim();
    let mut pairs = form_urlencoded::parse(body.as_bytes()).map(|(_, value)| value.into_owned());

    match (pairs.next(), pairs.next()) {
        (Some(access_token), Some(username)) if !access_token.is_empty() => Ok(AccessGrant {
            access_token,
            username,
        }),
        _ => Err(PocketError::NotAuthorized(format!(
            "expected access_token=...&username=..., got {body:?}"
        ))),
    }
}
