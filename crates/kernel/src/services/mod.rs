//! Kernel services.
//!
//! Collaborators the middleware depends on: the API description catalog,
//! bearer-token decoding, and access-log sinks. The middleware constructs
//! records; these services answer its lookups and carry its output.

pub mod catalog;
pub mod sink;
pub mod token;
