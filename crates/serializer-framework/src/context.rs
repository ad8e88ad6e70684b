//! # Pass Context
//!
//! A validation or representation pass threads a [`Context`] through every field
//! hook. It holds what was decided *during* the pass, most importantly which
//! child serializer each composite should delegate to.
//!
//! Composites do not own their resolved child. Instead each composite exposes a
//! [`ChildSlot`], and whoever resolves a schema publishes it with
//! [`ChildSlot::observe`]. The composite reads it back with
//! [`ChildSlot::current`] when it needs to delegate.
//!
//! ## Usage constraint
//!
//! One context belongs to one pass. Serializers themselves hold no per-pass
//! state and can be reused freely, but a context must not be shared between
//! passes running at the same time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::serializer::Serializer;

/// Identifies the child slot of one composite serializer (and its clones).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

impl SlotId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SlotId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The observer side of a composite serializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildSlot {
    id: SlotId,
    primary: bool,
}

impl ChildSlot {
    pub fn new(primary: bool) -> Self {
        Self {
            id: SlotId::next(),
            primary,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Whether a view-supplied serializer applies when this composite is the
    /// root of a pass.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Publishes the resolved child serializer for the rest of the pass.
    pub fn observe(&self, ctx: &mut Context, serializer: Arc<Serializer>) {
        ctx.children.insert(self.id, serializer);
    }

    /// The child serializer most recently published for this slot.
    pub fn current(&self, ctx: &Context) -> Option<Arc<Serializer>> {
        ctx.children.get(&self.id).cloned()
    }

    /// The serializer the serving view selected out-of-band, if it applies here.
    ///
    /// It applies to a primary composite that is the root of the pass, unless
    /// the view's serializer is that composite itself.
    pub fn view_serializer(&self, ctx: &Context) -> Option<Arc<Serializer>> {
        if self.primary && ctx.root == Some(self.id) && !ctx.root_is_view {
            ctx.view_serializer.clone()
        } else {
            None
        }
    }
}

/// Per-pass resolution state.
#[derive(Debug, Default)]
pub struct Context {
    children: HashMap<SlotId, Arc<Serializer>>,
    view_serializer: Option<Arc<Serializer>>,
    root: Option<SlotId>,
    root_is_view: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for a pass driven by a view that already picked its serializer.
    pub fn with_view_serializer(serializer: Arc<Serializer>) -> Self {
        Self {
            view_serializer: Some(serializer),
            ..Self::default()
        }
    }

    pub fn view_serializer(&self) -> Option<&Arc<Serializer>> {
        self.view_serializer.as_ref()
    }

    pub(crate) fn enter_root(&mut self, root: &Serializer) {
        self.root = root.slot().map(|slot| slot.id);
        self.root_is_view = self
            .view_serializer
            .as_ref()
            .is_some_and(|view| view.name() == root.name());
    }
}
