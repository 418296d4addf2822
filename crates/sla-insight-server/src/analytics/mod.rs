//! Windowed SLA analytics over stored tickets.

pub mod filters;
pub mod overview;
pub mod stats;

pub use filters::OverviewFilters;
pub use overview::{summarize, AnalyticsService, OverviewReport, ProblemCustomer};
