//! Contextual log metadata stored inside a [`Context`]
//!
//! The metadata mapping lives under [`CONTEXT_DATA_MAP_KEY`], a value of the
//! [`ContextDataKey`] type. That type can only be constructed inside this
//! crate, so an application key spelled `"context_data_map"` but declared with
//! its own type can never shadow or read the logger's mapping.
//!
//! Updating the mapping never mutates it: each call copies the nearest mapping,
//! overlays the new pairs and layers the result on a child context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Request;

use crate::context::Context;

/// Field name of the request identifier inside the mapping.
pub const CONTEXT_ID_KEY: &str = "id";

/// Contextual fields attached to every log entry made with a context.
pub type ContextData = BTreeMap<String, String>;

/// Lookup identity of the metadata mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextDataKey(&'static str);

impl ContextDataKey {
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ContextDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The single key the metadata mapping is stored under.
pub static CONTEXT_DATA_MAP_KEY: ContextDataKey = ContextDataKey("context_data_map");

/// A value able to hold and yield a [`Context`].
///
/// Implemented for [`Context`] itself and for HTTP requests, which keep their
/// context in the request extensions.
pub trait Carrier: Sized {
    /// The carried context, or the background context when none is attached.
    fn context(&self) -> Context;

    /// Replace the carried context.
    fn with_context(self, ctx: Context) -> Self;
}

impl Carrier for Context {
    fn context(&self) -> Context {
        self.clone()
    }

    fn with_context(self, ctx: Context) -> Self {
        ctx
    }
}

impl<B> Carrier for Request<B> {
    fn context(&self) -> Context {
        self.extensions()
            .get::<Context>()
            .cloned()
            .unwrap_or_default()
    }

    fn with_context(mut self, ctx: Context) -> Self {
        self.extensions_mut().insert(ctx);
        self
    }
}

/// Read the metadata mapping carried by `ctx`, if any.
pub fn context_data(ctx: &Context) -> Option<Arc<ContextData>> {
    ctx.shared_value::<_, ContextData>(&CONTEXT_DATA_MAP_KEY)
}

/// Seed a fresh mapping holding only the request identifier.
///
/// Any mapping already present on `parent` is shadowed, not merged.
///
/// # Examples
///
/// ```
/// use ctxlog::context::Context;
/// use ctxlog::logging::{build_context_data_and_set_value, context_data, CONTEXT_ID_KEY};
///
/// let ctx = build_context_data_and_set_value(&Context::background(), "r1");
/// let data = context_data(&ctx).unwrap();
/// assert_eq!(data.len(), 1);
/// assert_eq!(data[CONTEXT_ID_KEY], "r1");
/// ```
pub fn build_context_data_and_set_value(parent: &Context, request_id: impl Into<String>) -> Context {
    let mut data = ContextData::new();
    data.insert(CONTEXT_ID_KEY.to_string(), request_id.into());
    parent.with_value(CONTEXT_DATA_MAP_KEY, data)
}

/// Merge `extra_data` and the request identifier into the carrier's mapping.
///
/// The new mapping is the carrier's current mapping (empty when absent),
/// overlaid with `extra_data`, overlaid with the request identifier. The
/// explicit identifier wins even when `extra_data` supplies an `"id"` field.
///
/// # Examples
///
/// ```
/// use ctxlog::context::Context;
/// use ctxlog::logging::{
///     build_context_data_and_set_value, context_data, set_context_data_and_set_value,
/// };
///
/// let parent = build_context_data_and_set_value(&Context::background(), "r1");
/// let child = set_context_data_and_set_value(parent.clone(), [("http_method", "GET")], "r2");
///
/// let data = context_data(&child).unwrap();
/// assert_eq!(data["id"], "r2");
/// assert_eq!(data["http_method"], "GET");
/// assert_eq!(context_data(&parent).unwrap()["id"], "r1");
/// ```
pub fn set_context_data_and_set_value<C, I, K, V>(
    carrier: C,
    extra_data: I,
    request_id: impl Into<String>,
) -> C
where
    C: Carrier,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let ctx = carrier.context();

    let mut data = context_data(&ctx)
        .map(|existing| ContextData::clone(&existing))
        .unwrap_or_default();
    data.extend(
        extra_data
            .into_iter()
            .map(|(key, value)| (key.into(), value.into())),
    );
    data.insert(CONTEXT_ID_KEY.to_string(), request_id.into());

    carrier.with_context(ctx.with_value(CONTEXT_DATA_MAP_KEY, data))
}
