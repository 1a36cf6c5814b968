use std::cell::Cell;
use std::rc::Rc;

use crate::backend::{ChartBackend, SharedChart};
use crate::core::{ChartId, HorzDomain, PaneIndex, PaneIndexAllocator, SurfaceBounds};
use crate::error::{ChartError, ChartResult};

use super::PrimitiveCoordinator;

/// State a Chart Host shares with its descendants.
pub struct ChartContext<B: ChartBackend> {
    chart: SharedChart<B>,
    id: ChartId,
    panes: PaneIndexAllocator,
    chart_primitives: Rc<PrimitiveCoordinator>,
    surface: Cell<SurfaceBounds>,
    removed: Cell<bool>,
}

impl<B: ChartBackend> ChartContext<B> {
    pub(crate) fn new(
        chart: SharedChart<B>,
        surface: SurfaceBounds,
        chart_primitives: PrimitiveCoordinator,
    ) -> Self {
        let id = chart.borrow().chart_id();
        Self {
            chart,
            id,
            panes: PaneIndexAllocator::default(),
            chart_primitives: Rc::new(chart_primitives),
            surface: Cell::new(surface),
            removed: Cell::new(false),
        }
    }

    #[must_use]
    pub fn chart(&self) -> &SharedChart<B> {
        &self.chart
    }

    #[must_use]
    pub fn chart_id(&self) -> ChartId {
        self.id
    }

    #[must_use]
    pub fn panes(&self) -> &PaneIndexAllocator {
        &self.panes
    }

    /// Primitive source for the default pane.
    #[must_use]
    pub fn chart_primitives(&self) -> &Rc<PrimitiveCoordinator> {
        &self.chart_primitives
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceBounds {
        self.surface.get()
    }

    pub(crate) fn set_surface(&self, surface: SurfaceBounds) {
        self.surface.set(surface);
    }

    /// `true` once the host destroyed the chart; descendants skip backend calls.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub(crate) fn mark_removed(&self) {
        self.removed.set(true);
    }
}

/// Pane declaration state visible to series mounted inside it.
pub struct PaneContext {
    pub(crate) index: PaneIndex,
    pub(crate) primitives: Rc<PrimitiveCoordinator>,
}

/// Lookup value handed down to descendants in place of framework context.
///
/// A scope obtained from [`ChartHost::scope`](super::ChartHost::scope) carries
/// the chart; [`Scope::detached`] carries nothing, and mounting any
/// descendant against it fails with [`ChartError::MissingParentChart`].
pub struct Scope<B: ChartBackend> {
    chart: Option<Rc<ChartContext<B>>>,
    pane: Option<Rc<PaneContext>>,
}

impl<B: ChartBackend> Clone for Scope<B> {
    fn clone(&self) -> Self {
        Self {
            chart: self.chart.clone(),
            pane: self.pane.clone(),
        }
    }
}

impl<B: ChartBackend> Scope<B> {
    /// Scope with no enclosing chart.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            chart: None,
            pane: None,
        }
    }

    pub(crate) fn for_chart(chart: Rc<ChartContext<B>>) -> Self {
        Self {
            chart: Some(chart),
            pane: None,
        }
    }

    pub(crate) fn with_pane(&self, pane: Rc<PaneContext>) -> Self {
        Self {
            chart: self.chart.clone(),
            pane: Some(pane),
        }
    }

    #[must_use]
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    pub(crate) fn require_chart(&self, component: &'static str) -> ChartResult<Rc<ChartContext<B>>> {
        self.chart
            .clone()
            .ok_or(ChartError::MissingParentChart {
                component,
                family: <B::Domain as HorzDomain>::FAMILY,
            })
    }

    /// Index of the enclosing pane declaration, or the default pane.
    #[must_use]
    pub fn pane_index(&self) -> PaneIndex {
        self.pane
            .as_ref()
            .map_or(PaneIndex::DEFAULT, |pane| pane.index)
    }

    /// Enclosing pane declaration's primitive source when it owns `pane`.
    pub(crate) fn pane_primitives_for(&self, pane: PaneIndex) -> Option<Rc<PrimitiveCoordinator>> {
        self.pane
            .as_ref()
            .filter(|context| context.index == pane)
            .map(|context| context.primitives.clone())
    }
}
