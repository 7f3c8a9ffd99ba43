//! headers/container.rs
//! Thread-safe header container over generated field storage.
//!
//! Design notes:
//! - One `parking_lot::RwLock` per container. Reads take the shared mode,
//!   `set`/`remove`/`decode` the exclusive mode.
//! - Operations touching two containers snapshot one, release its lock, then
//!   lock the other. No thread ever holds two container locks.

use std::collections::BTreeMap;
use std::fmt;
use std::ptr;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value;

use crate::headers::types::{HeaderFields, HeaderValue};
use crate::types::HeaderError;

pub struct HeaderContainer<F> {
    fields: RwLock<F>,
}

impl<F: HeaderFields> HeaderContainer<F> {
    pub fn new() -> Self {
        Self::from_fields(F::default())
    }

    pub fn from_fields(fields: F) -> Self {
        Self {
            fields: RwLock::new(fields),
        }
    }

    /// Run `f` against the storage under the shared lock. Typed getters read
    /// through this.
    ///
    /// The lock is held only while `f` runs. Calling a mutating method on the
    /// same container from inside `f` deadlocks.
    pub fn with_fields<R>(&self, f: impl FnOnce(&F) -> R) -> R {
        f(&*self.fields.read())
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, F> {
        self.fields.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, F> {
        self.fields.write()
    }

    /// Owned copy of the current storage.
    pub fn snapshot(&self) -> F {
        self.read().clone()
    }

    pub fn get(&self, key: &str) -> Option<HeaderValue> {
        self.read().get_field(key)
    }

    /// Validate and store `value` under `key`. On error the container is
    /// unchanged.
    pub fn set(&self, key: &str, value: impl Into<HeaderValue>) -> Result<(), HeaderError> {
        self.write().set_field(key, value.into())
    }

    /// Clear a known field or drop an extension parameter. Unknown keys are
    /// ignored.
    pub fn remove(&self, key: &str) {
        self.write().remove_field(key);
    }

    /// Every present parameter keyed by wire key.
    pub fn as_map(&self) -> BTreeMap<String, HeaderValue> {
        let pairs = self.read().make_pairs();
        pairs.into_iter().map(|p| (p.key, p.value)).collect()
    }

    /// Copy of the extension parameters only.
    pub fn private_params(&self) -> BTreeMap<String, Value> {
        self.read().private_params().clone()
    }

    /// Set every present parameter of `self` on `dst`.
    ///
    /// Stops at the first refused value; parameters set before it stay set.
    pub fn copy_to(&self, dst: &Self) -> Result<(), HeaderError> {
        if ptr::eq(self, dst) {
            return Ok(());
        }
        let pairs = self.read().make_pairs();
        let mut fields = dst.write();
        for pair in pairs {
            fields.set_field(&pair.key, pair.value)?;
        }
        Ok(())
    }

    /// A new container holding `self` overridden by everything set on `other`.
    pub fn merge(&self, other: &Self) -> Result<Self, HeaderError> {
        let mut merged = self.snapshot();
        let pairs = other.read().make_pairs();
        for pair in pairs {
            merged.set_field(&pair.key, pair.value)?;
        }
        Ok(Self::from_fields(merged))
    }
}

impl<F: HeaderFields> Default for HeaderContainer<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: HeaderFields> Clone for HeaderContainer<F> {
    fn clone(&self) -> Self {
        Self::from_fields(self.snapshot())
    }
}

impl<F: HeaderFields> PartialEq for HeaderContainer<F> {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let mine = self.snapshot();
        mine == *other.read()
    }
}

impl<F: HeaderFields> fmt::Debug for HeaderContainer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderContainer")
            .field("fields", &*self.read())
            .finish()
    }
}

impl<F: HeaderFields> From<F> for HeaderContainer<F> {
    fn from(fields: F) -> Self {
        Self::from_fields(fields)
    }
}
