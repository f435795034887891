//! Blockfall (workspace facade crate).
//!
//! Re-exports the simulation core, the placement engine and the shared types under one
//! roof as `blockfall::{core, engine, types}`, and hosts the headless runner used by
//! the `blockfall` binary.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_types as types;

pub mod runner;
