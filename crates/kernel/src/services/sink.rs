//! Access-log sinks.
//!
//! The middleware constructs records; where they go is a deployment
//! decision. Sinks are write-only and fire-and-forget: emission returns
//! nothing and must not surface failures into request handling.

use crate::middleware::access_log::AccessLogRecord;

/// Destination for access-log records.
pub trait AccessLogSink: Send + Sync {
    /// Hand one record to the sink.
    fn emit(&self, record: &AccessLogRecord);
}

/// Sink that prints each record as one JSON line on stdout.
pub struct ConsoleSink;

impl AccessLogSink for ConsoleSink {
    fn emit(&self, record: &AccessLogRecord) {
        match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!(error = %e, "failed to serialize access-log record"),
        }
    }
}
