//! Once-only async initialization.
//!
//! [`InitCell`] holds a value produced by a single async initializer.
//! Concurrent acquirers all await the one in-flight initialization; a
//! failed initialization leaves the cell empty so a later acquire can try
//! again. The service uses this for the resolved location, which must be
//! computed once and shared.

use std::future::Future;
use std::ops::Deref;

use tokio::sync::OnceCell;

use crate::error::Result;

/// A cell initialized at most once by an async operation.
#[derive(Debug, Default)]
pub struct InitCell<T> {
    cell: OnceCell<T>,
}

impl<T> InitCell<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Acquire the value, running `init` if the cell is still empty.
    ///
    /// If another task is already initializing, this waits for that
    /// attempt instead of starting a second one. On failure the cell
    /// stays empty and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the initializer's error.
    pub async fn acquire<F, Fut>(&self, init: F) -> Result<InitGuard<'_, T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let value = self.cell.get_or_try_init(init).await?;
        Ok(InitGuard { value })
    }

    /// The value, if initialization has completed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Whether the cell has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

/// Borrowed access to an initialized [`InitCell`] value.
pub struct InitGuard<'a, T> {
    value: &'a T,
}

impl<T> Deref for InitGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value
    }
}
