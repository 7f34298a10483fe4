//! The CMS v3.5 signing scheme.
//!
//! Every request carries three headers: the canonical action string, the
//! auth-data line (protocol version, two reserved zero addresses, epoch
//! seconds, nonce, username) and a base64 HMAC over both plus the request
//! path. The remote side recomputes the HMAC byte for byte, so the message
//! layout here is fixed by the protocol.

use http::{HeaderMap, HeaderValue};
use log::debug;

use crate::credential::Credential;
use crate::hash::{base64_hmac_md5, base64_hmac_sha1, base64_hmac_sha256};
use crate::params::ApiParams;
use crate::time::{epoch_seconds, DateTime};
use crate::{Error, Result};

/// Header carrying the canonical action string.
pub const ACTION_HEADER: &str = "X-Akamai-ACS-Action";
/// Header carrying the signing metadata.
pub const AUTH_DATA_HEADER: &str = "X-Akamai-ACS-Auth-Data";
/// Header carrying the base64 HMAC signature.
pub const AUTH_SIGN_HEADER: &str = "X-Akamai-ACS-Auth-Sign";

// The signed message embeds the action header name in lower case. This is a
// literal token of the protocol, not derived from the outgoing header.
const ACTION_HEADER_LOWER: &str = "x-akamai-acs-action";

/// Keyed-hash variants of the signing protocol, each tied to a protocol
/// version identifier the server uses to pick the verification algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignAlgorithm {
    /// Version 3, HMAC-MD5.
    HmacMd5,
    /// Version 4, HMAC-SHA1.
    HmacSha1,
    /// Version 5, HMAC-SHA256. The recommended default.
    #[default]
    HmacSha256,
}

impl SignAlgorithm {
    /// Protocol version identifier, the first field of the auth-data line.
    pub fn version_id(&self) -> u32 {
        match self {
            SignAlgorithm::HmacMd5 => 3,
            SignAlgorithm::HmacSha1 => 4,
            SignAlgorithm::HmacSha256 => 5,
        }
    }

    fn base64_hmac(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            SignAlgorithm::HmacMd5 => base64_hmac_md5(key, content),
            SignAlgorithm::HmacSha1 => base64_hmac_sha1(key, content),
            SignAlgorithm::HmacSha256 => base64_hmac_sha256(key, content),
        }
    }
}

/// The three derived header values for one signed request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// `X-Akamai-ACS-Action` value, the canonical action string.
    pub action: String,
    /// `X-Akamai-ACS-Auth-Data` value.
    pub auth_data: String,
    /// `X-Akamai-ACS-Auth-Sign` value.
    pub auth_sign: String,
}

impl SignedHeaders {
    /// Insert the three headers into an outbound header map.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(ACTION_HEADER, HeaderValue::from_str(&self.action)?);
        headers.insert(AUTH_DATA_HEADER, HeaderValue::from_str(&self.auth_data)?);
        headers.insert(AUTH_SIGN_HEADER, {
            let mut value = HeaderValue::from_str(&self.auth_sign)?;
            value.set_sensitive(true);
            value
        });
        Ok(())
    }
}

/// Build the auth-data line.
///
/// The two `0.0.0.0` fields are reserved client/server address slots the
/// protocol no longer uses. The nonce only guards against accidental
/// collision of two requests signed within the same second; it carries no
/// replay-prevention duty.
pub fn auth_data(algorithm: SignAlgorithm, username: &str, now: DateTime, nonce: u32) -> String {
    format!(
        "{}, 0.0.0.0, 0.0.0.0, {}, {}, {}",
        algorithm.version_id(),
        epoch_seconds(now),
        nonce,
        username
    )
}

/// Compute the base64 HMAC signature over auth-data, request path and the
/// canonical action string.
pub fn auth_sign(
    algorithm: SignAlgorithm,
    key: &str,
    path: &str,
    action: &str,
    auth_data: &str,
) -> Result<String> {
    if key.is_empty() {
        return Err(Error::invalid_credentials(
            "credential has no secret key, cannot sign request",
        ));
    }

    let message = format!("{auth_data}{path}\n{ACTION_HEADER_LOWER}:{action}\n");
    debug!("sign message: {message:?}");

    Ok(algorithm.base64_hmac(key.as_bytes(), message.as_bytes()))
}

/// Derive all three signing headers for one request.
///
/// `path` must be the absolute path component of the request URI, without
/// scheme or host. `now` and `nonce` are explicit so callers (and tests)
/// control the clock and random source.
pub fn sign_headers(
    credential: &Credential,
    algorithm: SignAlgorithm,
    path: &str,
    params: &ApiParams,
    now: DateTime,
    nonce: u32,
) -> Result<SignedHeaders> {
    if params.action.is_empty() {
        return Err(Error::missing_parameters(
            "descriptor has no action set, nothing to sign",
        ));
    }

    let action = params.to_query_string();
    let auth_data = auth_data(algorithm, &credential.username, now, nonce);
    let auth_sign = auth_sign(algorithm, &credential.key, path, &action, &auth_data)?;

    Ok(SignedHeaders {
        action,
        auth_data,
        auth_sign,
    })
}
