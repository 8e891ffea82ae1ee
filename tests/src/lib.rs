//! Shared helpers for the end-to-end tests: payload fixtures, test doubles
//! for the store and the SDK transport, and a ready-made router context.

pub mod fixtures;
pub mod mocks;
pub mod setup;
