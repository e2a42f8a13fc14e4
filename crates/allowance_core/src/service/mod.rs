//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate store, rollover and ledger into one command/query API.
//! - Keep front ends decoupled from storage details.

pub mod session;
