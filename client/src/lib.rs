//! Client for the Akamai NetStorage CMS HTTP API.
//!
//! Every request is authenticated with the CMS v3.5 HMAC signing scheme
//! and executed with bounded retry-on-failure semantics. The pure signing
//! protocol lives in `netstorage-core`; this crate adds the execution
//! engine: transport abstraction, streaming uploads, retry budgets per
//! action class, and per-action convenience methods.
//!
//! ## Example
//!
//! ```no_run
//! use netstorage::{Client, Credential, ReqwestHttpSend};
//!
//! # async fn example() -> netstorage::Result<()> {
//! let credential = Credential::new("example-nsu.akamaihd.net", "user1", "secret1");
//! let client = Client::new(credential, ReqwestHttpSend::default());
//!
//! let _listing = client.dir("/123456").await?;
//! client.upload_file("/123456/data.bin", "./data.bin", false).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! The engine talks to the network through the [`HttpSend`] trait.
//! [`ReqwestHttpSend`] is the batteries-included implementation; tests and
//! embedders can provide their own. Transport-level failures and
//! non-success statuses are kept distinct so the retry policy can tell
//! them apart.
//!
//! ## Cancellation
//!
//! Every operation is a plain future. Dropping it aborts the in-flight
//! attempt and no further retries happen.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod body;
pub use body::{Body, BoxReader, UploadSource};

mod send;
pub use send::{HttpSend, ReqwestHttpSend, TransportOptions};

mod client;
pub use client::Client;

pub use netstorage_core::{
    ApiParams, Credential, Error, ErrorKind, Result, RetryPolicy, SignAlgorithm, ACTION_HEADER,
    AUTH_DATA_HEADER, AUTH_SIGN_HEADER,
};
