//! HTTP middleware components.
//!
//! Request interception and access-log record construction.

pub mod access_log;
pub mod interceptor;

pub use access_log::AccessLogRecord;
pub use interceptor::{BYPASS_PATHS, intercept_request};
