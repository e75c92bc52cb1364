//! A reader/writer lock with writer preference.
//!
//! [`SharedLock`] lets any number of readers hold the value at once, or
//! exactly one writer, never both. Once a writer is waiting, newly arriving
//! readers queue behind it, so a steady stream of searches cannot starve an
//! indexing thread.
//!
//! Access is scoped: [`SharedLock::read`] and [`SharedLock::write`] return
//! guards that release the lock when dropped, so the lock is released on every
//! exit path, including early `?` returns and panics.
//!
//! # Examples
//!
//! ```
//! use stemdex::sync::SharedLock;
//!
//! let lock = SharedLock::new(vec![1, 2, 3]);
//!
//! {
//!     let first = lock.read();
//!     let second = lock.read();
//!     assert_eq!(first.len() + second.len(), 6);
//! }
//!
//! lock.write().push(4);
//! assert_eq!(lock.with_read(|values| values.len()), 4);
//! ```
//!
//! The lock is not reentrant: a thread that already holds a guard must not
//! acquire another one from the same lock.

use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reader/writer lock protecting a value of type `T`.
///
/// Backed by [`parking_lot::RwLock`], whose fair policy parks new readers
/// while a writer is queued.
pub struct SharedLock<T: ?Sized> {
    inner: RwLock<T>,
}

impl<T> SharedLock<T> {
    /// Create a new unlocked lock holding `value`.
    pub fn new(value: T) -> Self {
        SharedLock {
            inner: RwLock::new(value),
        }
    }

    /// Consume the lock and return the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ?Sized> SharedLock<T> {
    /// Acquire shared access, blocking while a writer holds or waits for the
    /// lock.
    pub fn read(&self) -> SharedReadGuard<'_, T> {
        SharedReadGuard {
            guard: self.inner.read(),
        }
    }

    /// Acquire exclusive access, blocking until every reader and any other
    /// writer has released the lock.
    pub fn write(&self) -> SharedWriteGuard<'_, T> {
        SharedWriteGuard {
            guard: self.inner.write(),
        }
    }

    /// Run `f` with shared access and release the lock afterwards.
    pub fn with_read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.read();
        f(&guard)
    }

    /// Run `f` with exclusive access and release the lock afterwards.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.write();
        f(&mut guard)
    }

    /// Get mutable access without locking; the borrow checker already
    /// guarantees exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T: Default> Default for SharedLock<T> {
    fn default() -> Self {
        SharedLock::new(T::default())
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("SharedLock");
        match self.inner.try_read() {
            Some(guard) => debug.field("data", &&*guard),
            None => debug.field("data", &format_args!("<locked>")),
        };
        debug.finish()
    }
}

/// Shared access to the value inside a [`SharedLock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SharedReadGuard<'a, T: ?Sized> {
    guard: RwLockReadGuard<'a, T>,
}

impl<T: ?Sized> Deref for SharedReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

/// Exclusive access to the value inside a [`SharedLock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SharedWriteGuard<'a, T: ?Sized> {
    guard: RwLockWriteGuard<'a, T>,
}

impl<T: ?Sized> Deref for SharedWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: ?Sized> DerefMut for SharedWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedWriteGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}
