//! Request signing.
//!
//! ## Canonical string
//!
//! ```text
//! <nonce>/<method>?<k1>=<v1>&<k2>=<v2>...#<secret>
//! ```
//!
//! 1. `apiKey` and `time` (Unix seconds) are appended to the caller's params.
//! 2. Pairs are sorted by key, then value, over raw unescaped strings.
//! 3. A six-digit decimal nonce is drawn per call.
//! 4. `apiSig = nonce + hex(sha512(canonical string))`.
//!
//! Values are never percent-escaped when signing. The transmitted form is
//! the canonical list plus `apiSig`.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha512};

use crate::config::Credentials;

/// Number of decimal digits in a nonce.
pub const NONCE_LEN: usize = 6;

/// Ordered string parameters for one call. Duplicate keys are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::push`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}

/// A fully signed call, ready to transmit. Never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    /// Sorted pairs, including `apiKey` and `time`.
    pub params: Vec<(String, String)>,
    pub nonce: String,
    pub time: i64,
    pub signature: String,
}

impl SignedRequest {
    /// Form body: canonical pairs followed by `apiSig`.
    pub fn form(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("apiSig", self.signature.as_str())))
            .collect()
    }
}

/// Sign `method` with a fresh nonce and the current time.
pub fn sign(method: &str, params: &Params, credentials: &Credentials) -> SignedRequest {
    sign_at(method, params, credentials, &nonce(), Utc::now().timestamp())
}

/// Sign with an explicit nonce and timestamp. Pure.
pub fn sign_at(
    method: &str,
    params: &Params,
    credentials: &Credentials,
    nonce: &str,
    time: i64,
) -> SignedRequest {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    pairs.push(("apiKey".to_string(), credentials.api_key.clone()));
    pairs.push(("time".to_string(), time.to_string()));
    pairs.sort();

    let canonical = canonical_string(nonce, method, &pairs, &credentials.api_secret);
    let digest = hex::encode(Sha512::digest(canonical.as_bytes()));

    SignedRequest {
        method: method.to_string(),
        params: pairs,
        nonce: nonce.to_string(),
        time,
        signature: format!("{nonce}{digest}"),
    }
}

/// Build the exact string that is hashed. `sorted` must already be ordered.
pub fn canonical_string(
    nonce: &str,
    method: &str,
    sorted: &[(String, String)],
    secret: &str,
) -> String {
    let query = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{nonce}/{method}?{query}#{secret}")
}

/// Draw a fresh [`NONCE_LEN`]-digit nonce.
pub fn nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
