// Cloudlog Kernel
//
// Typed client primitives for a cloud logging API: handles, entry
// materialization and page-at-a-time entry listing over an injected
// transport.

pub mod client;
pub mod config;
pub mod entries;
pub mod logger;
pub mod sink;
pub mod transport;
