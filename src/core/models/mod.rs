pub mod query;
pub mod report;
pub mod time_series;
