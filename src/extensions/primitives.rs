use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::{ChartId, PaneIndex, SeriesId};
use crate::render::OverlayShape;

/// Object a primitive is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveTarget {
    Pane(PaneIndex),
    Series(SeriesId),
}

/// Passed to [`Primitive::attached`] by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachedParams {
    pub chart: ChartId,
    pub target: PrimitiveTarget,
}

/// Visual overlay participating in the backend's draw pass.
///
/// Primitives are owned by the component that declares them. The lifecycle
/// coordinator only attaches and detaches them; it never mutates one.
pub trait Primitive {
    /// Called before every draw pass so views can refresh cached geometry.
    fn update_all_views(&self);

    /// Shapes drawn on top of the target pane.
    fn pane_views(&self) -> Vec<OverlayShape>;

    fn attached(&self, _params: AttachedParams) {}

    fn detached(&self) {}
}

pub type PrimitiveRef = Rc<dyn Primitive>;

/// Declared primitive list. Changes are detected by reference identity only.
pub type PrimitiveList = Rc<[PrimitiveRef]>;

/// Invoked with the full list after it was attached or detached.
pub type PrimitiveListCallback = Rc<dyn Fn(&[PrimitiveRef])>;

/// Builds a fresh list identity.
#[must_use]
pub fn primitive_list(items: impl IntoIterator<Item = PrimitiveRef>) -> PrimitiveList {
    items.into_iter().collect::<Vec<_>>().into()
}

#[must_use]
pub fn empty_primitive_list() -> PrimitiveList {
    primitive_list(std::iter::empty())
}

#[must_use]
pub fn same_primitive(left: &PrimitiveRef, right: &PrimitiveRef) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

#[must_use]
pub fn same_list(left: &PrimitiveList, right: &PrimitiveList) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

/// Attached/detached notifications for one primitive source.
#[derive(Clone, Default)]
pub struct PrimitiveCallbacks {
    pub on_attached: Option<PrimitiveListCallback>,
    pub on_detached: Option<PrimitiveListCallback>,
}

impl PrimitiveCallbacks {
    #[must_use]
    pub fn on_attached(mut self, callback: impl Fn(&[PrimitiveRef]) + 'static) -> Self {
        self.on_attached = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_detached(mut self, callback: impl Fn(&[PrimitiveRef]) + 'static) -> Self {
        self.on_detached = Some(Rc::new(callback));
        self
    }

    pub(crate) fn notify_attached(&self, list: &[PrimitiveRef]) {
        if let Some(callback) = &self.on_attached {
            callback(list);
        }
    }

    pub(crate) fn notify_detached(&self, list: &[PrimitiveRef]) {
        if let Some(callback) = &self.on_detached {
            callback(list);
        }
    }
}

impl std::fmt::Debug for PrimitiveCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveCallbacks")
            .field("on_attached", &self.on_attached.is_some())
            .field("on_detached", &self.on_detached.is_some())
            .finish()
    }
}
