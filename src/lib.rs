//! A JSON Web Encryption (JWE) implementation following [RFC 7516] and the
//! algorithms from [RFC 7518].
//!
//! The crate is organized around a single in-memory model,
//! [`JsonWebEncryption`], which is
//!
//! * produced by a [`JweBuilder`](jwe::JweBuilder) from a payload and a set of
//!   recipients,
//! * consumed by a [`JweDecrypter`](jwe::JweDecrypter) that tries every
//!   candidate key against every recipient, and
//! * converted from and to the three wire formats by the serializers in
//!   [`format`].
//!
//! Every algorithm has to be opted in explicitly through an
//! [`AlgorithmManager`](jwe::algorithm::AlgorithmManager).
//!
//! [RFC 7516]: <https://datatracker.ietf.org/doc/html/rfc7516>
//! [RFC 7518]: <https://datatracker.ietf.org/doc/html/rfc7518>
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    explicit_outlives_requirements,
    clippy::missing_const_for_fn,
    clippy::missing_errors_doc
)]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    macro_use_extern_crate,
    non_ascii_idents,
    elided_lifetimes_in_paths
)]
#![forbid(unsafe_code)]
#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub(crate) mod base64_url;

pub mod compression;
pub mod crypto;
pub mod format;
pub mod header;
pub mod jwa;
pub mod jwe;
pub mod jwk;

#[doc(inline)]
pub use base64_url::{Base64UrlString, NoBase64UrlString};
#[doc(inline)]
pub use header::HeaderBag;
#[doc(inline)]
pub use jwe::JsonWebEncryption;

/// Type alias to make `JsonWebEncryption` easier to access.
pub type JWE = JsonWebEncryption;
