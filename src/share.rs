//! Share links: a whole deck packed into a single URL query parameter.
//!
//! The token is the deck's JSON, base64 encoded, then percent-encoded so
//! it survives as a query value.

use base64::Engine;
use tracing::debug;

use crate::deck::Deck;
use crate::error::DecodeError;

/// Query parameter carrying the token on the application URL.
pub const SHARE_PARAM: &str = "deck";

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

pub fn encode(deck: &Deck) -> String {
    // Deck only holds strings, vectors and a timestamp, which always serialize.
    let json = serde_json::to_string(deck).unwrap_or_default();
    let payload = ENGINE.encode(json.as_bytes());
    urlencoding::encode(&payload).into_owned()
}

pub fn decode(token: &str) -> Result<Deck, DecodeError> {
    let payload = urlencoding::decode(token)?;
    let bytes = ENGINE.decode(payload.trim().as_bytes())?;
    let json = std::str::from_utf8(&bytes)?;
    let deck: Deck = serde_json::from_str(json)?;
    deck.validate().map_err(DecodeError::InvalidDeck)?;

    debug!("Decoded shared deck '{}'", deck.title);
    Ok(deck)
}

/// Builds the shareable application URL for `deck`. The parameter goes
/// before any `#fragment` on the base URL.
pub fn share_url(base_url: &str, deck: &Deck) -> String {
    let (base, fragment) = match base_url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (base_url, None),
    };
    let separator = if base.contains('?') { '&' } else { '?' };

    let mut url = format!("{}{}{}={}", base, separator, SHARE_PARAM, encode(deck));
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Pulls the raw share token out of an application URL, if one is present.
pub fn token_from_url(url: &str) -> Option<&str> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
