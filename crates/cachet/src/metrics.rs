// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Metric sink trait and the OpenTelemetry implementation.

use std::time::Duration;

use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Gauge, Histogram, Meter, MeterProvider},
};

use crate::codec::CodecStats;

const METER_NAME: &str = "cachet";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
const CACHE_EVENT_COUNT_NAME: &str = "cache.event.count";
const CACHE_OPERATION_DURATION_NAME: &str = "cache.operation.duration";
const CACHE_CODEC_COUNT_NAME: &str = "cache.codec.count";

/// The operation a metric record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CacheOperation {
    Get,
    Set,
    Delete,
    Invalidate,
    Clear,
}

impl CacheOperation {
    /// Stable attribute value for this operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Invalidate => "invalidate",
            Self::Clear => "clear",
        }
    }
}

/// The outcome a metric record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum CacheActivity {
    Hit,
    Miss,
    Set,
    Deleted,
    Invalidated,
    Cleared,
    Error,
}

impl CacheActivity {
    /// Stable attribute value for this activity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Set => "set",
            Self::Deleted => "deleted",
            Self::Invalidated => "invalidated",
            Self::Cleared => "cleared",
            Self::Error => "error",
        }
    }
}

/// A sink receiving per-operation records and codec snapshots from a
/// [`MetricCache`](crate::MetricCache).
///
/// Implementations must be cheap and infallible; the decorator calls them on
/// the hot path and never lets them alter an operation's result.
pub trait Metrics: Send + Sync {
    /// Records one operation's outcome and duration.
    fn record(&self, cache_type: &'static str, operation: CacheOperation, activity: CacheActivity, duration: Duration);

    /// Records a snapshot of the wrapped cache's cumulative counters.
    fn record_from_codec(&self, cache_type: &'static str, stats: &CodecStats);
}

/// [`Metrics`] implementation exporting through an OpenTelemetry meter.
///
/// Publishes an event counter, an operation duration histogram, and a gauge
/// carrying the codec counters, all attributed with the cache type.
pub struct OtelMetrics {
    event_count: Counter<u64>,
    operation_duration: Histogram<f64>,
    codec_count: Gauge<u64>,
}

impl std::fmt::Debug for OtelMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelMetrics").finish_non_exhaustive()
    }
}

impl OtelMetrics {
    /// Creates the sink's instruments from the given meter provider.
    #[must_use]
    pub fn new(meter_provider: &dyn MeterProvider) -> Self {
        let meter = create_meter(meter_provider);
        Self {
            event_count: meter
                .u64_counter(CACHE_EVENT_COUNT_NAME)
                .with_description("Cache events")
                .with_unit("{event}")
                .build(),
            operation_duration: meter
                .f64_histogram(CACHE_OPERATION_DURATION_NAME)
                .with_description("Cache operation duration")
                .with_unit("s")
                .build(),
            codec_count: meter
                .u64_gauge(CACHE_CODEC_COUNT_NAME)
                .with_description("Cumulative cache operation counters")
                .with_unit("{operation}")
                .build(),
        }
    }
}

fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

impl Metrics for OtelMetrics {
    fn record(&self, cache_type: &'static str, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        let attributes = [
            KeyValue::new("cache.type", cache_type),
            KeyValue::new("cache.operation", operation.as_str()),
            KeyValue::new("cache.activity", activity.as_str()),
        ];
        self.event_count.add(1, &attributes);
        self.operation_duration.record(duration.as_secs_f64(), &attributes);
    }

    fn record_from_codec(&self, cache_type: &'static str, stats: &CodecStats) {
        for (stat, value) in stats.iter() {
            self.codec_count.record(
                value,
                &[KeyValue::new("cache.type", cache_type), KeyValue::new("cache.stat", stat)],
            );
        }
    }
}
