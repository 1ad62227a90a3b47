pub mod config;
pub mod error;
pub mod heap;
pub mod logger;
pub mod median_filter;
pub mod progbase;
pub mod ring;

pub use error::Error;
pub use median_filter::MedianFilter;
