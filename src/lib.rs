pub mod analytics;
pub mod cache;
pub mod config;
pub mod cost;
pub mod filter;
pub mod models;
pub mod stats;
pub mod worker;

pub use analytics::{aggregate, ChartDataBundle};
pub use cache::ChartCache;
pub use cost::{parse_cost, CostValue};
pub use filter::apply_filters;
pub use models::{FilterSpec, Record};
pub use stats::{compute_stats, Stats};
