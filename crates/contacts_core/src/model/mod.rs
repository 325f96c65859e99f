//! Contact domain model and request contracts.
//!
//! # Responsibility
//! - Define the persisted contact shape and its field rules.
//! - Define create/update input contracts validated before persistence.
//!
//! # Invariants
//! - Every contact is identified by a store-assigned positive `ContactId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod contact;
pub mod input;
pub mod rules;
