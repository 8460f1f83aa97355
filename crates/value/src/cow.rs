//! Reference-counted copy-on-write cell.
//!
//! Cloning a [`CowBox`] bumps a reference count and aliases the payload.
//! [`CowBox::mutable_get`] deep-copies the payload first when another
//! handle still shares it, so a mutation through one handle is never
//! observed through another.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub struct CowBox<T> {
    inner: Arc<T>,
}

impl<T> CowBox<T> {
    pub fn new(value: T) -> Self {
        CowBox {
            inner: Arc::new(value),
        }
    }

    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Whether both handles alias the same payload.
    pub fn ptr_eq(a: &CowBox<T>, b: &CowBox<T>) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Number of handles sharing the payload.
    pub fn use_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn is_unique(&self) -> bool {
        self.use_count() == 1
    }
}

impl<T: Clone> CowBox<T> {
    /// Mutable access to a payload owned by this handle alone, copying
    /// it first if it is shared.
    pub fn mutable_get(&mut self) -> &mut T {
        Arc::make_mut(&mut self.inner)
    }

    /// Take the payload, copying it when other handles still share it.
    pub fn into_inner(self) -> T {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl<T> Clone for CowBox<T> {
    fn clone(&self) -> Self {
        CowBox {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Deref for CowBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Default> Default for CowBox<T> {
    fn default() -> Self {
        CowBox::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for CowBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for CowBox<T> {
    fn eq(&self, other: &Self) -> bool {
        CowBox::ptr_eq(self, other) || *self.inner == *other.inner
    }
}

impl<T: Eq> Eq for CowBox<T> {}
