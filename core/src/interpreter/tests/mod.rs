//! Scenario tests for the interpreter
//!
//! Organized by executor

mod helpers;

mod call_tests;
