//! Call translation helpers.
//!
//! Pure functions turning call options and a target into the URL and body
//! of a transport request.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::{CallOptions, SyncTarget};

/// Resolves the endpoint: `options.url` first, then the target's own URL.
///
/// # Errors
///
/// Returns [`Error::MissingUrl`] if neither supplies one.
pub fn resolve_url(options: &CallOptions, target: &dyn SyncTarget) -> Result<String> {
    match &options.url {
        Some(url) => Ok(url.resolve()),
        None => target.url().ok_or(Error::MissingUrl),
    }
}

/// Builds the request body.
///
/// `options.data` is sent as-is. Otherwise `options.attrs`, then the
/// target's serialization, then an empty map. A patch without an `id`
/// gets the target's identifier.
#[must_use]
pub fn build_payload(options: &CallOptions, target: &dyn SyncTarget) -> Map<String, Value> {
    let mut payload = match &options.data {
        Some(data) => data.clone(),
        None => options
            .attrs
            .clone()
            .or_else(|| target.to_json(options))
            .unwrap_or_default(),
    };

    let has_id = payload.get("id").is_some_and(|id| !id.is_null());
    if options.patch
        && !has_id
        && let Some(id) = target.id()
    {
        payload.insert("id".to_string(), id);
    }

    payload
}
