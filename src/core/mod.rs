pub mod config;
pub mod middleware;
pub mod rate_limit;
pub mod shared;
