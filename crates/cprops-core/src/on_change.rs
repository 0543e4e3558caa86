#![forbid(unsafe_code)]

//! Change-gated prop mapper.
//!
//! # Design
//!
//! [`MapPropsOnChange`] owns a single-slot cache: the watched subset of props
//! seen at the last recomputation and the mapper output computed from it. On
//! every call the current watched subset is compared against the cached one
//! with [`Props::shallow_eq`]. Equal subsets reuse the cached output; any
//! difference calls the mapper again and replaces both cache slots.
//!
//! The returned props are always `props` without the watched keys, overlaid
//! by the (possibly reused) mapper output.
//!
//! # Invariants
//!
//! 1. The first call always invokes the mapper.
//! 2. Two consecutive calls whose watched subsets are shallow-equal invoke the
//!    mapper at most once between them.
//! 3. `version()` increments by exactly 1 per mapper invocation.
//! 4. With an empty watch set the mapper runs once for the lifetime of the
//!    instance (unless [`invalidate`](MapPropsOnChange::invalidate) is used).
//!
//! # Failure Modes
//!
//! - **Mapper panics**: the cache slot is left empty, so the next call
//!   recomputes.
//! - **Re-entrant call** (the mapper calls back into the same instance):
//!   panics on the cache borrow. Calls into one instance must be sequential.

use std::cell::{Cell, RefCell};
use std::fmt;

use crate::transform::{Outcome, Transform};
use crate::value::{Props, State};

/// The memoized computation owned by one [`MapPropsOnChange`].
struct OnChangeCache {
    /// Watched subset of props at the last recomputation.
    last_watched: Props,
    /// Mapper output computed from `last_watched`.
    last_computed: Props,
}

/// Transform produced by [`map_props_on_change`].
pub struct MapPropsOnChange<F> {
    watch: Vec<String>,
    mapper: F,
    /// Empty before the first call.
    cache: RefCell<Option<OnChangeCache>>,
    /// Forces the next call to recompute regardless of the watched values.
    dirty: Cell<bool>,
    /// Number of mapper invocations so far.
    version: Cell<u64>,
}

impl<F> MapPropsOnChange<F>
where
    F: Fn(&State, &Props) -> Props,
{
    /// Keys gating recomputation, in declaration order.
    #[must_use]
    pub fn watch_set(&self) -> &[String] {
        &self.watch
    }

    /// Number of times the mapper has run.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Whether a computation is cached.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Force the next call to recompute even if the watched values are
    /// unchanged.
    pub fn invalidate(&self) {
        self.dirty.set(true);
    }

    fn recompute(&self, state: &State, props: &Props, watched: Props) -> OnChangeCache {
        let last_computed = (self.mapper)(state, props);
        self.dirty.set(false);
        self.version.set(self.version.get() + 1);
        tracing::trace!(
            message = "props.on_change.recompute",
            version = self.version.get(),
            watched = self.watch.len()
        );
        OnChangeCache {
            last_watched: watched,
            last_computed,
        }
    }
}

impl<F> Transform for MapPropsOnChange<F>
where
    F: Fn(&State, &Props) -> Props,
{
    fn apply(&self, state: &State, props: Props) -> Outcome {
        let watched = props.pick(&self.watch);
        let mut slot = self.cache.borrow_mut();
        let cache = match slot.take() {
            Some(cache) if !self.dirty.get() && cache.last_watched.shallow_eq(&watched) => {
                tracing::trace!(message = "props.on_change.hit", version = self.version.get());
                cache
            }
            _ => self.recompute(state, &props, watched),
        };
        let computed = cache.last_computed.clone();
        *slot = Some(cache);
        Outcome::Props(props.omit(&self.watch).overlay(computed))
    }
}

impl<F> fmt::Debug for MapPropsOnChange<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("MapPropsOnChange")
            .field("watch", &self.watch)
            .field("cached", &cache.as_ref().map(|c| &c.last_computed))
            .field("dirty", &self.dirty.get())
            .field("version", &self.version.get())
            .finish()
    }
}

/// Build a change-gated mapper watching `watch_set`.
///
/// Each call to this function yields an independent cache.
///
/// ```
/// use cprops_core::{Transform, Value, map_props_on_change, props};
///
/// let item = Value::from(props! { "id" => 1 });
/// let label = map_props_on_change(["item"], |_state, props| {
///     let id = props
///         .get("item")
///         .and_then(Value::as_map)
///         .and_then(|item| item.get_as::<i64>("id").ok());
///     props! { "label" => id.map(|id| format!("item #{id}")) }
/// });
///
/// let out = label.apply(&props! {}, props! { "item" => item.clone(), "a" => 1 });
/// assert_eq!(out.into_props(), props! { "a" => 1, "label" => "item #1" });
///
/// let _ = label.apply(&props! {}, props! { "item" => item, "a" => 2 });
/// assert_eq!(label.version(), 1);
/// ```
pub fn map_props_on_change<I, F>(watch_set: I, mapper: F) -> MapPropsOnChange<F>
where
    I: IntoIterator,
    I::Item: Into<String>,
    F: Fn(&State, &Props) -> Props,
{
    MapPropsOnChange {
        watch: watch_set.into_iter().map(Into::into).collect(),
        mapper,
        cache: RefCell::new(None),
        dirty: Cell::new(false),
        version: Cell::new(0),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
