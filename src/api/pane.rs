use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::backend::ChartBackend;
use crate::core::PaneIndex;
use crate::error::ChartResult;
use crate::extensions::{PrimitiveCallbacks, PrimitiveList, empty_primitive_list};

use super::{ChartContext, PaneContext, PrimitiveCoordinator, PrimitiveScope, Scope};

/// Inputs of a Pane declaration.
#[derive(Clone, Default)]
pub struct PaneProps {
    /// Explicit index; auto-assigned from the chart's allocator when `None`.
    pub index: Option<PaneIndex>,
    pub primitives: Option<PrimitiveList>,
    pub callbacks: PrimitiveCallbacks,
}

impl PaneProps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_index(mut self, index: PaneIndex) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_primitives(mut self, primitives: PrimitiveList) -> Self {
        self.primitives = Some(primitives);
        self
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: PrimitiveCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

/// Declares a pane and its primitive list.
///
/// The index is resolved exactly once, at mount, and stays stable for the
/// declaration's lifetime. The pane itself is created by the backend when the
/// first series targets it.
pub struct Pane<B: ChartBackend> {
    context: Rc<ChartContext<B>>,
    pane: Rc<PaneContext>,
    scope: Scope<B>,
    mounted: bool,
}

impl<B: ChartBackend> Pane<B> {
    pub fn mount(parent: &Scope<B>, props: PaneProps) -> ChartResult<Self> {
        let context = parent.require_chart("Pane")?;
        let index = context.panes().assign(props.index)?;
        if index.is_default() {
            warn!(
                chart = %context.chart_id(),
                "pane declared at the default index; its series use the chart primitive list"
            );
        }
        debug!(chart = %context.chart_id(), pane = %index, "pane mounted");

        let coordinator = PrimitiveCoordinator::new(
            PrimitiveScope::Pane,
            props.primitives.unwrap_or_else(empty_primitive_list),
            props.callbacks,
        );
        let pane = Rc::new(PaneContext {
            index,
            primitives: Rc::new(coordinator),
        });
        let scope = parent.with_pane(pane.clone());
        Ok(Self {
            context,
            pane,
            scope,
            mounted: true,
        })
    }

    #[must_use]
    pub fn index(&self) -> PaneIndex {
        self.pane.index
    }

    /// Scope for series declared inside this pane.
    #[must_use]
    pub fn scope(&self) -> Scope<B> {
        self.scope.clone()
    }

    #[must_use]
    pub fn primitives(&self) -> &Rc<PrimitiveCoordinator> {
        &self.pane.primitives
    }

    /// Replaces the pane's primitive list; re-attached only on identity change.
    pub fn set_primitives(&mut self, primitives: PrimitiveList) -> ChartResult<()> {
        self.pane.primitives.replace(&self.context, primitives)
    }

    pub fn set_primitive_callbacks(&mut self, callbacks: PrimitiveCallbacks) {
        self.pane.primitives.set_callbacks(callbacks);
    }

    pub fn unmount(mut self) -> ChartResult<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        self.context.panes().release(self.pane.index);
        self.pane.primitives.release_all(&self.context)?;
        debug!(chart = %self.context.chart_id(), pane = %self.pane.index, "pane unmounted");
        Ok(())
    }
}

impl<B: ChartBackend> Drop for Pane<B> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!(error = %err, pane = %self.pane.index, "pane teardown failed");
        }
    }
}

impl<B: ChartBackend> fmt::Debug for Pane<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pane")
            .field("chart", &self.context.chart_id())
            .field("index", &self.pane.index)
            .field("mounted", &self.mounted)
            .finish()
    }
}
