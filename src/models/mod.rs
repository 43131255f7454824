pub mod filter;
pub mod record;

pub use filter::{parse_filter_date, FilterSpec, FILTER_DATE_FORMAT};
pub use record::{parse_timestamp, ContactTime, Record};
