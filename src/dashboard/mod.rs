//! The dashboard page: headline totals, charts, budget utilization, and
//! recent transactions.

mod aggregation;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
