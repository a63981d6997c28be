//! Unit tests for otelcol-installer
//!
//! These tests use recording mocks and scratch directories and run fast
//! without touching the real host or network.

mod architecture;
mod install_flow;
mod property_tests;
