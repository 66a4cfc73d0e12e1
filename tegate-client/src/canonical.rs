//! Canonical request URLs.
//!
//! The canonical URL is both what gets fetched and the cache key, so it has
//! to be a pure function of (base, key, path, effective query).

use url::Url;

use tegate_core::constants::{API_KEY_PARAM, FORMAT_JSON, FORMAT_PARAM};
use tegate_core::error::{ProxyError, Result};
use tegate_core::types::QueryParams;

/// Builds the outbound URL for `path` under `base_url`.
///
/// The API key and `f=json` come first, followed by every non-empty
/// passthrough parameter in key order. Passthrough values for the reserved
/// `c` and `f` parameters are ignored.
pub fn canonical_url(
    base_url: &str,
    api_key: &str,
    path: &str,
    query: &QueryParams,
) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    let raw = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };

    let mut url = Url::parse(&raw)
        .map_err(|e| ProxyError::Config(format!("invalid upstream URL '{raw}': {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair(API_KEY_PARAM, api_key);
        pairs.append_pair(FORMAT_PARAM, FORMAT_JSON);
        for (key, value) in query.effective() {
            if key == API_KEY_PARAM || key == FORMAT_PARAM {
                continue;
            }
            pairs.append_pair(key, value);
        }
    }

    Ok(url.into())
}

/// Percent-encodes one path segment (`/` included), the way
/// `encodeURIComponent` does.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
