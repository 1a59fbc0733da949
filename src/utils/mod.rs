pub mod metrics;

// Re-export commonly used items
pub use metrics::{Metrics, MetricsSnapshot};
