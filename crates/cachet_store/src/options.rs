// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-call and per-store cache policies.

use std::time::Duration;

/// Policy applied to a single `set`, or held by a store as its defaults.
///
/// When a `set` is issued without options, the store applies its default
/// `Options` wholesale; fields of a per-call `Options` are never merged with
/// the defaults field by field.
///
/// # Examples
///
/// ```
/// use cachet_store::Options;
/// use std::time::Duration;
///
/// let options = Options::new()
///     .with_expiration(Duration::from_secs(30))
///     .with_cost(8)
///     .with_tags(["books", "authors"]);
///
/// assert_eq!(options.expiry(), Some(Duration::from_secs(30)));
/// assert_eq!(options.cost, 8);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Time before the entry expires. `None` or zero means no expiration.
    pub expiration: Option<Duration>,
    /// Integer weight used by cost-based backends for admission and eviction.
    pub cost: i64,
    /// Tags indexing this key for bulk invalidation.
    pub tags: Vec<String>,
}

impl Options {
    /// Creates empty options: no expiration, zero cost, no tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expiration duration.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Sets the cost weight.
    #[must_use]
    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// The expiration normalized so that a zero duration means "no expiry".
    #[must_use]
    pub fn expiry(&self) -> Option<Duration> {
        self.expiration.filter(|d| !d.is_zero())
    }
}

/// Selector naming which tag groups an `invalidate` should sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidateOptions {
    /// Tags whose indexed keys are removed.
    pub tags: Vec<String>,
}

impl InvalidateOptions {
    /// Creates a selector for the given tags.
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}
