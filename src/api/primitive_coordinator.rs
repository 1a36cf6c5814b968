use std::cell::RefCell;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::ChartBackend;
use crate::core::PaneIndex;
use crate::error::ChartResult;
use crate::extensions::{PrimitiveCallbacks, PrimitiveList, PrimitiveTarget, same_list};

use super::ChartContext;

/// Where a pane-scope primitive list is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveScope {
    /// Chart Host list, applied to the default pane.
    Chart,
    /// Pane declaration list, applied to that pane.
    Pane,
}

impl PrimitiveScope {
    #[must_use]
    pub fn for_pane(pane: PaneIndex) -> Self {
        if pane.is_default() {
            Self::Chart
        } else {
            Self::Pane
        }
    }
}

/// Set of primitives currently attached to one target, treated as a value:
/// every change is a full detach followed by a full attach.
#[derive(Default)]
pub struct AttachedPrimitives {
    current: Option<PrimitiveList>,
}

impl AttachedPrimitives {
    #[must_use]
    pub fn current(&self) -> Option<&PrimitiveList> {
        self.current.as_ref()
    }

    /// Detaches the attached list, if any, and returns it.
    pub fn detach_all<B: ChartBackend>(
        &mut self,
        context: &ChartContext<B>,
        target: PrimitiveTarget,
    ) -> ChartResult<Option<PrimitiveList>> {
        let Some(previous) = self.current.take() else {
            return Ok(None);
        };
        detach_list(context, target, &previous)?;
        debug!(?target, count = previous.len(), "primitives detached");
        Ok(Some(previous))
    }

    /// Attaches every primitive of `list`. The list is recorded before the
    /// first call so a failure part-way is still cleaned up by the next detach.
    pub fn attach_all<B: ChartBackend>(
        &mut self,
        context: &ChartContext<B>,
        target: PrimitiveTarget,
        list: PrimitiveList,
    ) -> ChartResult<()> {
        self.current = Some(list.clone());
        if context.is_removed() {
            return Ok(());
        }
        let mut chart = context.chart().borrow_mut();
        for primitive in list.iter() {
            chart.attach_primitive(target, primitive)?;
        }
        debug!(?target, count = list.len(), "primitives attached");
        Ok(())
    }

    /// Detach-then-attach with callbacks in lifecycle order.
    ///
    /// On first activation there is no previous list, so the incoming list
    /// itself is detached first. Backends treat detaching a primitive that is
    /// not attached as a no-op, which leaves a fresh target untouched and
    /// clears any attachment left behind by someone else.
    pub fn replace<B: ChartBackend>(
        &mut self,
        context: &ChartContext<B>,
        target: PrimitiveTarget,
        list: PrimitiveList,
        callbacks: &PrimitiveCallbacks,
    ) -> ChartResult<()> {
        match self.detach_all(context, target)? {
            Some(previous) => callbacks.notify_detached(&previous),
            None => detach_list(context, target, &list)?,
        }
        self.attach_all(context, target, list.clone())?;
        callbacks.notify_attached(&list);
        Ok(())
    }

    pub fn clear<B: ChartBackend>(
        &mut self,
        context: &ChartContext<B>,
        target: PrimitiveTarget,
        callbacks: &PrimitiveCallbacks,
    ) -> ChartResult<()> {
        if let Some(previous) = self.detach_all(context, target)? {
            callbacks.notify_detached(&previous);
        }
        Ok(())
    }
}

fn detach_list<B: ChartBackend>(
    context: &ChartContext<B>,
    target: PrimitiveTarget,
    list: &PrimitiveList,
) -> ChartResult<()> {
    if context.is_removed() {
        return Ok(());
    }
    let mut chart = context.chart().borrow_mut();
    for primitive in list.iter() {
        chart.detach_primitive(target, primitive)?;
    }
    Ok(())
}

struct PaneBinding {
    holders: usize,
    applied: AttachedPrimitives,
}

/// Pane-scope primitive lifecycle for one source (the Chart Host or one
/// Pane declaration).
///
/// Every series bound to a pane acquires the coordinator on mount and
/// releases it on teardown. The declared list is attached when the first
/// series binds, swapped wholesale whenever the list identity changes, and
/// detached when the last series releases, so a pane shared by several
/// series sees each primitive attached once.
pub struct PrimitiveCoordinator {
    scope: PrimitiveScope,
    declared: RefCell<PrimitiveList>,
    callbacks: RefCell<PrimitiveCallbacks>,
    bindings: RefCell<IndexMap<PaneIndex, PaneBinding>>,
}

impl PrimitiveCoordinator {
    #[must_use]
    pub fn new(scope: PrimitiveScope, list: PrimitiveList, callbacks: PrimitiveCallbacks) -> Self {
        Self {
            scope,
            declared: RefCell::new(list),
            callbacks: RefCell::new(callbacks),
            bindings: RefCell::new(IndexMap::new()),
        }
    }

    #[must_use]
    pub fn scope(&self) -> PrimitiveScope {
        self.scope
    }

    #[must_use]
    pub fn declared(&self) -> PrimitiveList {
        self.declared.borrow().clone()
    }

    /// Number of series currently bound to `pane`.
    #[must_use]
    pub fn holders(&self, pane: PaneIndex) -> usize {
        self.bindings
            .borrow()
            .get(&pane)
            .map_or(0, |binding| binding.holders)
    }

    #[must_use]
    pub fn attached_list(&self, pane: PaneIndex) -> Option<PrimitiveList> {
        self.bindings
            .borrow()
            .get(&pane)
            .and_then(|binding| binding.applied.current().cloned())
    }

    pub fn set_callbacks(&self, callbacks: PrimitiveCallbacks) {
        *self.callbacks.borrow_mut() = callbacks;
    }

    /// Binds one series in `pane`; the first binding attaches the declared list.
    ///
    /// When that first attach fails the binding is rolled back: the holder is
    /// dropped and whatever was attached before the failure is detached again.
    pub fn acquire<B: ChartBackend>(&self, context: &ChartContext<B>, pane: PaneIndex) -> ChartResult<()> {
        {
            let mut bindings = self.bindings.borrow_mut();
            if let Some(binding) = bindings.get_mut(&pane) {
                binding.holders += 1;
                return Ok(());
            }
            bindings.insert(
                pane,
                PaneBinding {
                    holders: 1,
                    applied: AttachedPrimitives::default(),
                },
            );
        }
        debug!(scope = ?self.scope, %pane, "primitive scope activated");
        if let Err(err) = self.sync_pane(context, pane) {
            self.roll_back(context, pane);
            return Err(err);
        }
        Ok(())
    }

    /// Unbinds one series; the last release detaches the applied list.
    pub fn release<B: ChartBackend>(&self, context: &ChartContext<B>, pane: PaneIndex) -> ChartResult<()> {
        let binding = {
            let mut bindings = self.bindings.borrow_mut();
            let Some(binding) = bindings.get_mut(&pane) else {
                return Ok(());
            };
            binding.holders = binding.holders.saturating_sub(1);
            if binding.holders > 0 {
                return Ok(());
            }
            bindings.shift_remove(&pane)
        };
        let Some(mut binding) = binding else {
            return Ok(());
        };
        let callbacks = self.callbacks.borrow().clone();
        binding
            .applied
            .clear(context, PrimitiveTarget::Pane(pane), &callbacks)
    }

    /// Replaces the declared list; a no-op when `list` is the same reference.
    pub fn replace<B: ChartBackend>(&self, context: &ChartContext<B>, list: PrimitiveList) -> ChartResult<()> {
        if same_list(&self.declared.borrow(), &list) {
            return Ok(());
        }
        *self.declared.borrow_mut() = list;
        let panes: Vec<PaneIndex> = self.bindings.borrow().keys().copied().collect();
        for pane in panes {
            self.sync_pane(context, pane)?;
        }
        Ok(())
    }

    /// Detaches everything regardless of bound series. Used when the
    /// declaring component unmounts before its series.
    pub fn release_all<B: ChartBackend>(&self, context: &ChartContext<B>) -> ChartResult<()> {
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        let callbacks = self.callbacks.borrow().clone();
        for (pane, mut binding) in bindings {
            if binding.holders > 0 {
                warn!(
                    scope = ?self.scope,
                    %pane,
                    holders = binding.holders,
                    "primitive source unmounted while series are still bound"
                );
            }
            binding
                .applied
                .clear(context, PrimitiveTarget::Pane(pane), &callbacks)?;
        }
        Ok(())
    }

    fn sync_pane<B: ChartBackend>(&self, context: &ChartContext<B>, pane: PaneIndex) -> ChartResult<()> {
        let Some(mut applied) = self.take_applied(pane) else {
            return Ok(());
        };
        let list = self.declared();
        let callbacks = self.callbacks.borrow().clone();
        let target = PrimitiveTarget::Pane(pane);
        let result = applied.replace(context, target, list, &callbacks);

        let orphaned = {
            let mut bindings = self.bindings.borrow_mut();
            if let Some(binding) = bindings.get_mut(&pane) {
                binding.applied = applied;
                None
            } else {
                Some(applied)
            }
        };
        // Released from inside a callback: nothing holds the pane any more.
        if let Some(mut orphaned) = orphaned {
            orphaned.clear(context, target, &callbacks)?;
        }
        result
    }

    fn roll_back<B: ChartBackend>(&self, context: &ChartContext<B>, pane: PaneIndex) {
        let binding = self.bindings.borrow_mut().shift_remove(&pane);
        let Some(mut binding) = binding else {
            return;
        };
        if let Err(err) = binding.applied.detach_all(context, PrimitiveTarget::Pane(pane)) {
            warn!(scope = ?self.scope, %pane, error = %err, "primitive rollback failed");
        }
    }

    fn take_applied(&self, pane: PaneIndex) -> Option<AttachedPrimitives> {
        self.bindings
            .borrow_mut()
            .get_mut(&pane)
            .map(|binding| std::mem::take(&mut binding.applied))
    }
}
