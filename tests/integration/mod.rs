//! Integration test suite for conductor.
//!
//! These tests exercise the full pipeline from plan submission to
//! quiescence, including remote mirroring and multi-step plan execution.
//!
//! # Test Categories
//!
//! - `orchestration_e2e`: Plan, approve, and run to quiescence
//! - `sync_round_trip`: Local/remote convergence properties
//! - `plan_execution`: Sequential executor against a live registry
//!
//! All tests run against simulated collaborators and an in-memory remote,
//! so they make no network calls and are safe in CI.

mod fixtures;

mod orchestration_e2e;
mod plan_execution;
mod sync_round_trip;
