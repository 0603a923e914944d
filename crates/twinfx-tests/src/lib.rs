//! Integration tests for twinfx crates.
//!
//! End-to-end checks that go through the real codec, the session service and
//! the worker pool together.
