//! # Rollcall Core
//!
//! Date coordination for organisations: admins propose candidate dates,
//! members answer through a public link, and a finished schedule is turned
//! into a standalone attendance collection.
//!
//! - **models**: schedules, candidates, responses and attendance records,
//!   including the schedule state machine
//! - **reconcile**: identity-preserving diff of candidate lists
//! - **repositories**: persistence, transaction and clock contracts
//! - **services**: the use cases, each run inside one transaction
//!
//! Nothing in this crate talks to a database directly. Enable the `mock`
//! feature for an in-memory store and mockall mocks of the contracts.

pub mod errors;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod services;
pub mod token;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
