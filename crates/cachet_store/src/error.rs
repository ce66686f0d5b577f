// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for store and cache operations.

use std::error::Error as StdError;

/// Boxed error preserved from a backend client or a user-supplied loader.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error from a store or cache operation.
///
/// Backend adapters wrap their client's failures with [`client`](Self::client)
/// so the original typed error stays reachable, while misses and cost
/// rejections are reported through dedicated variants that callers can match
/// on without knowing which backend produced them.
///
/// # For Consumers
///
/// Extract the underlying client error with [`source_as`](Self::source_as):
///
/// ```
/// use cachet_store::Error;
///
/// let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
/// let error = Error::client(io_err);
///
/// assert!(error.is_source::<std::io::Error>());
/// let extracted = error.source_as::<std::io::Error>().unwrap();
/// assert_eq!(extracted.kind(), std::io::ErrorKind::ConnectionRefused);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested key is absent from the backend.
    ///
    /// Every `get`-like operation reports a miss this way; a miss is never a
    /// nil-like success.
    #[error("value not found in {store} store")]
    NotFound {
        /// Type identifier of the store that reported the miss.
        store: &'static str,
    },

    /// A cost-based backend refused the write.
    #[error("an error has occurred while setting value '{value}' on key '{key}'")]
    SetRejected {
        /// The key whose write was rejected.
        key: String,
        /// Rendering of the rejected value.
        value: String,
    },

    /// No tier of a chain cache held the key.
    #[error("value not found in any cache of the chain (last checked: {last})")]
    ChainMiss {
        /// Type identifier of the last tier consulted.
        last: String,
    },

    /// A user-supplied loader failed; nothing was cached.
    #[error("{0}")]
    Load(#[source] BoxError),

    /// A backend client operation failed; the source error is preserved.
    #[error("{0}")]
    Client(#[source] BoxError),
}

impl Error {
    /// Creates a miss error for the given store type.
    #[must_use]
    pub fn not_found(store: &'static str) -> Self {
        Self::NotFound { store }
    }

    /// Creates a cost-rejection error citing the offending key and value.
    pub fn set_rejected(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::SetRejected {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Wraps a backend client failure, preserving the source error type for
    /// later extraction via [`source_as`](Self::source_as).
    pub fn client(source: impl Into<BoxError>) -> Self {
        Self::Client(source.into())
    }

    /// Wraps a loader failure.
    pub fn load(source: impl Into<BoxError>) -> Self {
        Self::Load(source.into())
    }

    /// Returns `true` when the error reports an absent key rather than a
    /// backend failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ChainMiss { .. })
    }

    /// Returns `true` if the source error is of type `T`.
    #[must_use]
    pub fn is_source<T: StdError + 'static>(&self) -> bool {
        self.source_as::<T>().is_some()
    }

    /// Returns the source error as type `T` if it matches.
    #[must_use]
    pub fn source_as<T: StdError + 'static>(&self) -> Option<&T> {
        self.source().and_then(|s| s.downcast_ref::<T>())
    }
}

/// A specialized [`Result`] type for store and cache operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, ErrorKind};

    #[test]
    fn not_found_display_names_the_store() {
        let error = Error::not_found("redis");
        assert_eq!(error.to_string(), "value not found in redis store");
        assert!(error.is_not_found());
    }

    #[test]
    fn set_rejected_display_cites_key_and_value() {
        let error = Error::set_rejected("my-key", "my-cache-value");
        let message = error.to_string();
        assert!(message.contains("my-key"), "message should contain the key, got: {message}");
        assert!(
            message.contains("my-cache-value"),
            "message should contain the value, got: {message}"
        );
    }

    #[test]
    fn chain_miss_is_not_found() {
        let error = Error::ChainMiss { last: "redis".into() };
        assert!(error.is_not_found());
        assert!(error.to_string().contains("redis"));
    }

    #[test]
    fn client_preserves_source_type() {
        let io_err = io::Error::new(ErrorKind::ConnectionRefused, "connection refused");
        let error = Error::client(io_err);

        assert!(error.is_source::<io::Error>());
        let extracted = error.source_as::<io::Error>().expect("should extract io::Error");
        assert_eq!(extracted.kind(), ErrorKind::ConnectionRefused);
    }

    #[test]
    fn client_display_is_transparent() {
        let error = Error::client(io::Error::new(ErrorKind::TimedOut, "deadline exceeded"));
        assert_eq!(error.to_string(), "deadline exceeded");
        assert!(!error.is_not_found());
    }

    #[test]
    fn load_display_is_transparent() {
        let error = Error::load("An error has occurred while loading data from custom source");
        assert_eq!(
            error.to_string(),
            "An error has occurred while loading data from custom source"
        );
    }

    #[test]
    fn source_as_returns_none_for_wrong_type() {
        let error = Error::client(io::Error::new(ErrorKind::NotFound, "not found"));
        assert!(error.source_as::<std::fmt::Error>().is_none());
    }

    #[test]
    fn result_type_alias_propagates_errors() {
        fn returns_err() -> Result<i32> {
            Err(Error::not_found("memory"))
        }

        let err = returns_err().expect_err("should return an error");
        assert!(err.is_not_found());
    }
}
