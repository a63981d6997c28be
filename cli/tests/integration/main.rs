//! Integration tests for otelcol-installer
//!
//! These tests spawn the actual binary. Only paths that stop before the
//! host is modified are exercised here; the full flows are covered by the
//! unit suite against a scratch root.
