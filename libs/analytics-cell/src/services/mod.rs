pub mod stats;

pub use stats::{build_trend, AnalyticsService};
