//! OAuth 1.0a request signing (HMAC-SHA1), as required by the posting API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

use super::{Credentials, PublishError};

type HmacSha1 = Hmac<Sha1>;

// RFC 3986 unreserved characters stay as they are, everything else is escaped
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[must_use]
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

#[must_use]
pub fn nonce(timestamp: i64) -> String {
    let count = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let digest = Sha256::new()
        .chain_update(timestamp.to_be_bytes())
        .chain_update(count.to_be_bytes())
        .chain_update(std::process::id().to_be_bytes())
        .finalize();
    format!("{:x}", digest)[..32].to_string()
}

/// Builds the signature base string: method, base url and the sorted parameter string.
/// Query parameters of `url` are signed alongside `params`.
#[must_use]
pub fn signature_base(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<String>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(base_url.as_str()),
        encode(&param_string)
    )
}

/// # Errors
///
/// Will return Err if the signing key is rejected by the MAC
pub fn sign(
    base: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, PublishError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(PublishError::Signing)?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Produces the `Authorization` header value for one request. `params` are any
/// form-encoded body parameters; a JSON body contributes none.
///
/// # Errors
///
/// Will return Err if the request cannot be signed
pub fn authorization_header(
    method: &str,
    url: &Url,
    params: &[(String, String)],
    credentials: &Credentials,
    nonce: &str,
    timestamp: i64,
) -> Result<String, PublishError> {
    let mut oauth_params = vec![
        (
            String::from("oauth_consumer_key"),
            String::from(credentials.consumer_key.expose()),
        ),
        (String::from("oauth_nonce"), String::from(nonce)),
        (
            String::from("oauth_signature_method"),
            String::from("HMAC-SHA1"),
        ),
        (String::from("oauth_timestamp"), timestamp.to_string()),
        (
            String::from("oauth_token"),
            String::from(credentials.access_token.expose()),
        ),
        (String::from("oauth_version"), String::from("1.0")),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend(params.iter().cloned());

    let base = signature_base(method, url, &all_params);
    let signature = sign(
        &base,
        credentials.consumer_secret.expose(),
        credentials.access_token_secret.expose(),
    )?;
    oauth_params.push((String::from("oauth_signature"), signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<String>>()
        .join(", ");
    Ok(format!("OAuth {}", fields))
}
