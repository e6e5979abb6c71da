//! Error types.

use alloc::string::String;
use core::fmt;

/// The kind of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// A value of the wrong shape was supplied.
    ///
    /// Raised for nested query values and for anything other than a mapping
    /// or a sequence of pairs where query values are expected.
    Type,
    /// The input is not a valid URI, or a mutation would leave the URI in an
    /// inconsistent state.
    InvalidUri,
    /// An argument is not acceptable for the operation.
    ///
    /// Raised when routing between relative URIs, when naming an unknown
    /// component, and when constructing from conflicting components.
    Argument,
    /// A mutation was attempted on a frozen URI.
    Frozen,
}

/// An error occurred when parsing, mutating or combining URIs.
///
/// # Examples
///
/// ```
/// use fluid_uri::{ErrorKind, Uri};
///
/// let e = Uri::parse("http://[<invalid>]/").unwrap_err();
/// assert_eq!(e.kind(), ErrorKind::InvalidUri);
/// assert_eq!(e.index(), Some(8));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    index: Option<usize>,
    msg: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            index: None,
            msg: msg.into(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidUri, msg)
    }

    pub(crate) fn invalid_at(index: usize, msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidUri,
            index: Some(index),
            msg: msg.into(),
        }
    }

    pub(crate) fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, msg)
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, msg)
    }

    pub(crate) fn frozen() -> Self {
        Self::new(ErrorKind::Frozen, "can't modify frozen URI")
    }

    /// Shifts the error index by `offset`, for errors raised on a component
    /// that starts `offset` bytes into the input.
    pub(crate) fn offset(mut self, offset: usize) -> Self {
        if let Some(i) = &mut self.index {
            *i += offset;
        }
        self
    }

    /// Returns the kind of the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the byte index in the input at which a grammar error occurred,
    /// if known.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Returns the error message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ErrorKind::Type => "type error",
            ErrorKind::InvalidUri => "invalid URI",
            ErrorKind::Argument => "invalid argument",
            ErrorKind::Frozen => "frozen URI",
        };
        write!(f, "{prefix}: {}", self.msg)?;
        if let Some(i) = self.index {
            write!(f, " at index {i}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "impl-error")]
impl crate::StdError for Error {}

pub(crate) type Result<T, E = Error> = core::result::Result<T, E>;
