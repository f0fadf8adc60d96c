/// Share links: a layout packed into a short, pasteable string.
///
/// ## Format
///   `#` + base64( `{"holes":[[c,r],...],"golds":[...],"wumpus":[...]}` )
///
/// Standard base64 alphabet with padding. Coordinates are `[column, row]`.
/// On decode the leading `#` is optional, surrounding whitespace is ignored
/// and anything up to the last `#` is dropped, so a whole URL works too.
/// Missing lists decode as empty.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::domain::layout::{Layout, LayoutError};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("share link is empty")]
    Empty,

    #[error("share link is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("share link payload is not a layout: {0}")]
    Json(#[from] serde_json::Error),

    #[error("share link layout rejected: {0}")]
    Layout(#[from] LayoutError),
}

pub fn encode(layout: &Layout) -> Result<String, ShareError> {
    let json = serde_json::to_string(layout)?;
    Ok(format!("#{}", STANDARD.encode(json)))
}

/// Parse a link into a layout. Placement rules are checked by the caller
/// against its own grid size.
pub fn decode(link: &str) -> Result<Layout, ShareError> {
    let link = link.trim();
    let payload = match link.rfind('#') {
        Some(i) => &link[i + 1..],
        None => link,
    };
    if payload.is_empty() {
        return Err(ShareError::Empty);
    }
    let bytes = STANDARD.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}
