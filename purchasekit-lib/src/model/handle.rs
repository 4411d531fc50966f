//! Opaque backend object handle.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased token a provider adapter attaches to a [`Product`] so the
/// original backend object can be handed back to the SDK at purchase time.
///
/// The handle is owned by the adapter that created it and must not be
/// inspected anywhere else; it is skipped during serialization and ignored
/// by product equality. An adapter receiving a product with a missing or
/// foreign handle re-resolves the product by identifier instead.
///
/// [`Product`]: crate::model::Product
#[derive(Clone)]
pub struct BackendHandle(Arc<dyn Any + Send + Sync>);

impl BackendHandle {
    /// Wrap a backend object.
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    /// Get the wrapped object back, if it is of type `T`.
    ///
    /// Returns `None` for handles created by a different adapter.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BackendHandle(..)")
    }
}
