//! Tests for the supporting pieces
//!
//! These tests verify:
//! - The background worker queue
//! - Clocks
//! - Content id interning

mod intern_tests;
