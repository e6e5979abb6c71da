#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![cfg_attr(not(feature = "std"), no_std)]

//! A mutable URI/IRI library following IETF [RFC 3986] and [RFC 3987].
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//! [RFC 3987]: https://datatracker.ietf.org/doc/html/rfc3987/
//!
//! The parser is permissive: any string splits into a scheme, an authority,
//! a path, a query and a fragment, and only the scheme, the host and the
//! port are checked. Normalization then brings a [`Uri`] into a canonical
//! form, with percent-encoding, case, default ports, dot segments and
//! internationalized host names taken care of.
//!
//! See the documentation of [`Uri`] for more details.
//!
//! # Examples
//!
//! ```
//! use fluid_uri::Uri;
//!
//! let uri = Uri::parse("HTTP://www.Example.com:80/a/./b/../c?q#f")?;
//! assert_eq!(uri.normalize().to_string(), "http://www.example.com/a/c?q#f");
//!
//! let base = Uri::parse("http://a/b/c/d;p?q")?;
//! assert_eq!(base.join_str("../g")?.to_string(), "http://a/b/g");
//! # Ok::<_, fluid_uri::Error>(())
//! ```
//!
//! # Feature flags
//!
//! All features except `std` are disabled by default.
//!
//! - `std`: Enables `std` support. This includes [`Error`] implementations.
//!
//! - `net`: Enables [`Host::ip_addr`], which returns the IP address of a
//!   host as an [`IpAddr`](core::net::IpAddr).
//!
//! - `serde`: Enables [`serde`] support for [`Uri`].
//!
//! [`Error`]: std::error::Error
//! [`serde`]: https://docs.rs/serde

extern crate alloc;

pub mod component;
mod convert;
mod error;
mod fmt;
pub mod host;
pub mod normalize;
mod parse;
pub mod pct_enc;
pub mod query;
pub mod resolve;
mod uri;

pub use component::{Component, Components, Host, Parts, Scheme};
pub use error::{Error, ErrorKind};
pub use query::{QueryShape, QueryValue, QueryValues};
pub use uri::Uri;

#[cfg(feature = "std")]
use std::error::Error as StdError;

#[cfg(all(feature = "impl-error", not(feature = "std")))]
use core::error::Error as StdError;
