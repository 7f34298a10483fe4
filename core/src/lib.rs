//! Core types for the Akamai NetStorage CMS API client.
//!
//! This crate holds everything that does not touch the network: the
//! parameter descriptor and its canonical serialization, the CMS v3.5
//! signing scheme, failure classification and the retry strategy. The
//! sibling `netstorage` crate drives these over an HTTP transport.
//!
//! ## Overview
//!
//! One signed request is assembled from three pieces:
//!
//! - [`ApiParams`] describes the operation and serializes into the
//!   canonical action string.
//! - [`sign_headers`] derives the three `X-Akamai-ACS-*` header values
//!   from that string, the request path, a [`Credential`] and a
//!   [`SignAlgorithm`].
//! - [`classify_failure`] and [`RetryPolicy`] decide what a failed
//!   response means and whether it is worth another attempt.
//!
//! The clock and the nonce are explicit inputs throughout, so every
//! transform in this crate is deterministic and testable.
//!
//! ## Example
//!
//! ```
//! use netstorage_core::{sign_headers, ApiParams, Credential, SignAlgorithm};
//!
//! # fn main() -> netstorage_core::Result<()> {
//! let credential = Credential::new("example-nsu.akamaihd.net", "user1", "secret1");
//! let params = ApiParams::download();
//!
//! let signed = sign_headers(
//!     &credential,
//!     SignAlgorithm::default(),
//!     "/123456/file.bin",
//!     &params,
//!     netstorage_core::time::now(),
//!     1234,
//! )?;
//! assert_eq!(signed.action, "version=1&action=download");
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod credential;
pub use credential::Credential;

mod params;
pub use params::{ApiParams, ACS_VERSION, QUICK_DELETE_SENTINEL, ZIP_EXTENSION};

mod sign;
pub use sign::{
    auth_data, auth_sign, sign_headers, SignAlgorithm, SignedHeaders, ACTION_HEADER,
    AUTH_DATA_HEADER, AUTH_SIGN_HEADER,
};

mod validate;
pub use validate::{classify_failure, MAX_CLOCK_DRIFT_SECS};

mod retry;
pub use retry::RetryPolicy;
