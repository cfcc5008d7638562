//! Immutable request-scoped contexts
//!
//! A [`Context`] is a persistent linked chain of key/value nodes. Deriving a
//! child never touches the parent, so a context can be cloned and shared
//! across threads freely and two derivations from the same parent never
//! observe each other.
//!
//! Keys are typed: a lookup only matches a node whose key has the identical
//! Rust type *and* compares equal. Two keys with the same textual form but
//! different types never alias each other.
//!
//! # Example
//!
//! ```
//! use ctxlog::context::Context;
//!
//! #[derive(Debug, PartialEq)]
//! struct TenantKey;
//!
//! let root = Context::background();
//! let ctx = root.with_value(TenantKey, "acme".to_string());
//!
//! assert_eq!(ctx.value::<_, String>(&TenantKey).map(String::as_str), Some("acme"));
//! assert!(root.value::<_, String>(&TenantKey).is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Types usable as context keys.
///
/// Blanket-implemented for every `'static` type with `PartialEq` that can be
/// shared between threads.
pub trait ContextKey: Any + PartialEq + Send + Sync {}

impl<T> ContextKey for T where T: Any + PartialEq + Send + Sync {}

struct Node {
    key: Box<dyn Any + Send + Sync>,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

impl Drop for Node {
    // Unlink iteratively; the default recursive drop overflows the stack on
    // long chains.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            next = match Arc::into_inner(node) {
                Some(mut node) => node.parent.take(),
                None => break,
            };
        }
    }
}

/// Immutable, hierarchical carrier of request-scoped values.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Derive a child context carrying `value` under `key`.
    pub fn with_value<K, V>(&self, key: K, value: V) -> Self
    where
        K: ContextKey,
        V: Any + Send + Sync,
    {
        self.with_shared_value(key, Arc::new(value))
    }

    /// Derive a child context carrying an already shared value.
    pub fn with_shared_value<K, V>(&self, key: K, value: Arc<V>) -> Self
    where
        K: ContextKey,
        V: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Node {
                key: Box::new(key),
                value,
                parent: self.head.clone(),
            })),
        }
    }

    /// Look up the nearest value stored under `key`.
    ///
    /// Returns `None` when no ancestor carries the key, or when the nearest
    /// node for the key holds a value of another type.
    pub fn value<K, V>(&self, key: &K) -> Option<&V>
    where
        K: ContextKey,
        V: Any + Send + Sync,
    {
        self.find(key).and_then(|node| node.value.downcast_ref::<V>())
    }

    /// Like [`Context::value`], but hands out a shared handle to the value.
    pub fn shared_value<K, V>(&self, key: &K) -> Option<Arc<V>>
    where
        K: ContextKey,
        V: Any + Send + Sync,
    {
        self.find(key)
            .and_then(|node| Arc::clone(&node.value).downcast::<V>().ok())
    }

    /// Number of values layered on top of the background context.
    pub fn depth(&self) -> usize {
        self.nodes().count()
    }

    /// Whether this is the empty root context.
    pub fn is_background(&self) -> bool {
        self.head.is_none()
    }

    fn find<K: ContextKey>(&self, key: &K) -> Option<&Node> {
        self.nodes()
            .find(|node| node.key.downcast_ref::<K>().is_some_and(|k| k == key))
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .finish()
    }
}
