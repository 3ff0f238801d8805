//! Render adapters: read-only mappings from a [`ReplayFrame`] to what the
//! presentation layer draws.
//!
//! Adapters never touch projections directly and never fail; unknown
//! participants and missing stats fall back to placeholders and zeros.
//!
//! [`ReplayFrame`]: crate::dispatcher::ReplayFrame

pub mod feed;
pub mod org_chart;
pub mod progress;
pub mod stats_strip;

pub use feed::{FeedAccent, FeedEntry, FeedView, clock_label};
pub use org_chart::{ChartEdge, ChartNode, OrgChartGraph};
pub use progress::ProgressHeader;
pub use stats_strip::{QueueLevel, StatsStrip};
