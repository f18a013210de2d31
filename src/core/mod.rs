//! Feed models, the Content API client, and report aggregation.

pub mod content_api;
pub mod feeds;
pub mod http;
pub mod logging;
pub mod models;
pub mod report;

pub use content_api::ContentApiClient;
pub use feeds::{Datafeed, DatafeedStatus, FeedService, join_feeds, parse_count};
pub use models::{AccountEntry, Cell, FeedRecord, ReportRow, ViewMode};
pub use report::{aggregate, select_rows};
