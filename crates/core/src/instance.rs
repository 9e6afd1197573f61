// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live instances participating in post-redefinition reconciliation

use thiserror::Error;

/// Errors from updating a single instance.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    #[error("reinitialize failed: {0}")]
    Reinitialize(String),
    #[error("proxy refresh failed: {0}")]
    ProxyRefresh(String),
    #[error("factory reset failed: {0}")]
    FactoryReset(String),
}

/// A live object of a hot-swappable class.
///
/// Implementations are registered with the instance tracker via weak
/// references; the tracker never extends an instance's lifetime.
pub trait HotInstance: Send + Sync {
    /// Fully-qualified name of this instance's class.
    fn class_name(&self) -> &str;

    /// Rebuild internal state against the current class definition
    /// (field-by-field copy from a freshly constructed template).
    fn reinitialize(&self) -> Result<(), UpdateError>;

    /// Whether this instance is a proxy wrapper around a delegate.
    fn is_proxy(&self) -> bool {
        false
    }

    /// Re-resolve the delegate behind a proxy wrapper.
    fn refresh_proxy(&self) -> Result<(), UpdateError> {
        Err(UpdateError::Unsupported("proxy refresh"))
    }
}

/// Collaborator that owns instances of a class and can rebuild them.
pub trait InstanceFactory: Send + Sync {
    /// Discard and re-create the factory's instances of `class_name`.
    /// Returns the number of instances reset.
    fn reset(&self, class_name: &str) -> Result<usize, UpdateError>;
}
