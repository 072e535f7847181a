//! oauth::signature
//!
//! The signature engine: canonical base string and HMAC-SHA1 signature.
//!
//! # Algorithm
//!
//! ```text
//! base   = METHOD & enc(base_url) & enc(normalized_parameters)
//! key    = enc(consumer_secret) & enc(token_secret)
//! sig    = base64(HMAC-SHA1(key, base))
//! ```
//!
//! `normalized_parameters` is every parameter (URL query, body, oauth_*),
//! each key and value percent-encoded, sorted by encoded key then encoded
//! value, joined as `k=v` with `&`. Insertion order never matters.
//!
//! Everything here is pure. Nothing performs I/O.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::encoding::{percent_encode, split_url};
use super::errors::OAuthError;
use crate::transport::HttpMethod;

/// Value of `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

type HmacSha1 = Hmac<Sha1>;

/// Build the normalized parameter string.
pub fn normalize_parameters<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    // Tuple ordering is key first, value second: exactly the OAuth rule.
    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string.
///
/// Query parameters already present on `url` are folded into the parameter
/// set; the URL itself is reduced to its base form.
///
/// # Errors
///
/// [`OAuthError::Encoding`] when the URL cannot be canonicalized.
pub fn base_string(
    method: HttpMethod,
    url: &str,
    params: &[(String, String)],
) -> Result<String, OAuthError> {
    let split = split_url(url)?;

    let all = split
        .query
        .iter()
        .chain(params.iter())
        .map(|(k, v)| (k.as_str(), v.as_str()));

    Ok(format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(&split.base),
        percent_encode(&normalize_parameters(all))
    ))
}

/// Build the HMAC key. `token_secret` is empty before any token exists.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// Compute the `oauth_signature` value for a request.
///
/// `params` must contain every parameter that will be sent, including the
/// oauth_* protocol parameters but excluding `oauth_signature` itself.
///
/// # Errors
///
/// [`OAuthError::Encoding`] when the URL cannot be canonicalized.
pub fn sign(
    method: HttpMethod,
    url: &str,
    params: &[(String, String)],
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, OAuthError> {
    let base = base_string(method, url, params)?;
    let key = signing_key(consumer_secret, token_secret);
    hmac_sha1_base64(&key, &base)
}

fn hmac_sha1_base64(key: &str, data: &str) -> Result<String, OAuthError> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| OAuthError::Encoding(format!("cannot key HMAC-SHA1: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
