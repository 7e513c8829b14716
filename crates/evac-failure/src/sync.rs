//! Atomic primitives used by the tracker.
//!
//! Under `--cfg loom` these resolve to loom's model-checked atomics so the
//! claim protocols can be explored exhaustively.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
