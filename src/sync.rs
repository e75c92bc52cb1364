//! Synchronization primitives.

pub mod shared_lock;

pub use shared_lock::{SharedLock, SharedReadGuard, SharedWriteGuard};
