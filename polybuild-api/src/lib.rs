//! # polybuild-api
//!
//! Signed access to the Polygon problem-authoring API.
//!
//! - [`methods`] — operation-key → remote method registry
//! - [`signer`] — canonical request signing
//! - [`client`] — blocking HTTP client and response classification
//! - [`config`] — credentials and client settings

pub mod client;
pub mod config;
pub mod error;
pub mod methods;
pub mod signer;

pub use client::{classify, Api, Client};
pub use config::{ApiConfig, Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, CredentialsError, MethodError};
pub use methods::{keys, MethodEntry, MethodRegistry};
pub use signer::{sign, sign_at, Params, SignedRequest};
