use std::sync::Once;

use metrics::{Unit, describe_counter};

pub const METRIC_MEMORY_HIT: &str = "scorta_memory_hit_total";
pub const METRIC_MEMORY_MISS: &str = "scorta_memory_miss_total";
pub const METRIC_MEMORY_EVICT: &str = "scorta_memory_evict_total";
pub const METRIC_DISK_HIT: &str = "scorta_disk_hit_total";
pub const METRIC_DISK_MISS: &str = "scorta_disk_miss_total";
pub const METRIC_REMOTE_HIT: &str = "scorta_remote_hit_total";
pub const METRIC_REMOTE_MISS: &str = "scorta_remote_miss_total";
pub const METRIC_PUSH: &str = "scorta_push_total";
pub const METRIC_PUSH_ERROR: &str = "scorta_push_error_total";
pub const METRIC_PUSH_BYTES: &str = "scorta_push_bytes_total";
pub const METRIC_PUSH_DROPPED: &str = "scorta_push_dropped_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Register descriptions for every metric the crate emits.
///
/// Safe to call more than once; only the first call registers.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_MEMORY_HIT,
            Unit::Count,
            "Total number of memory-tier cache hits."
        );
        describe_counter!(
            METRIC_MEMORY_MISS,
            Unit::Count,
            "Total number of memory-tier cache misses."
        );
        describe_counter!(
            METRIC_MEMORY_EVICT,
            Unit::Count,
            "Total number of memory-tier evictions due to capacity."
        );
        describe_counter!(
            METRIC_DISK_HIT,
            Unit::Count,
            "Total number of disk-tier cache hits."
        );
        describe_counter!(
            METRIC_DISK_MISS,
            Unit::Count,
            "Total number of disk-tier cache misses."
        );
        describe_counter!(
            METRIC_REMOTE_HIT,
            Unit::Count,
            "Total number of remote-tier cache hits."
        );
        describe_counter!(
            METRIC_REMOTE_MISS,
            Unit::Count,
            "Total number of remote-tier cache misses."
        );
        describe_counter!(
            METRIC_PUSH,
            Unit::Count,
            "Total number of remote pushes completed successfully."
        );
        describe_counter!(
            METRIC_PUSH_ERROR,
            Unit::Count,
            "Total number of remote pushes that failed or timed out."
        );
        describe_counter!(
            METRIC_PUSH_BYTES,
            Unit::Bytes,
            "Cumulative payload bytes pushed to remote storage."
        );
        describe_counter!(
            METRIC_PUSH_DROPPED,
            Unit::Count,
            "Total number of remote pushes dropped because the queue was full."
        );
    });
}
