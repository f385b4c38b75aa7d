//! Aggregation of several highlighted regions into one mask.
//!
//! Each highlight source registers once and then reports whether it is active and
//! which bounds it wants left unmasked. The mask is shown while any source is
//! active and excludes the bounds of every source.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::config::DissectConfig;
use crate::error::{DissectError, Result};
use crate::mask::{MaskLayout, is_masked};
use crate::model::Rect;

pub type NotifierId = u64;

type ClickHandler = Box<dyn FnMut(bool) + Send>;

#[derive(Default)]
struct Source {
    active: bool,
    bounds: Vec<Rect>,
    on_click: Option<ClickHandler>,
}

pub struct MaskController {
    next_id: NotifierId,
    sources: BTreeMap<NotifierId, Source>,
}

impl Default for MaskController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MaskController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskController")
            .field("sources", &self.sources.len())
            .field("active", &self.is_active())
            .finish()
    }
}

impl MaskController {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            sources: BTreeMap::new(),
        }
    }

    /// Registers a new highlight source. Ids start at 1 and are never reused.
    pub fn register(&mut self) -> NotifierId {
        let id = self.next_id;
        self.next_id += 1;
        self.sources.insert(id, Source::default());
        trace!(id, "registered highlight source");
        id
    }

    /// Removes a source; its bounds no longer affect the mask.
    pub fn unregister(&mut self, id: NotifierId) -> Result<()> {
        self.sources
            .remove(&id)
            .map(|_| ())
            .ok_or(DissectError::UnknownNotifier(id))
    }

    /// Replaces the state reported by `id`.
    pub fn notify(&mut self, id: NotifierId, active: bool, bounds: Vec<Rect>) -> Result<()> {
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(DissectError::UnknownNotifier(id))?;
        source.active = active;
        source.bounds = bounds;
        Ok(())
    }

    /// Sets the handler invoked by [`MaskController::click`] for source `id`.
    pub fn on_click<F>(&mut self, id: NotifierId, handler: F) -> Result<()>
    where
        F: FnMut(bool) + Send + 'static,
    {
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(DissectError::UnknownNotifier(id))?;
        source.on_click = Some(Box::new(handler));
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.sources.values().any(|s| s.active)
    }

    /// Bounds of every source, concatenated in id order.
    pub fn bounds(&self) -> Vec<Rect> {
        self.sources
            .values()
            .flat_map(|s| s.bounds.iter().copied())
            .collect()
    }

    /// Mask layout for `page`, or `None` while no source is active.
    pub fn layout(&self, page: Rect, cfg: &DissectConfig) -> Result<Option<MaskLayout>> {
        if !self.is_active() {
            return Ok(None);
        }
        MaskLayout::build(page, self.bounds(), cfg).map(Some)
    }

    /// Routes a click to every source's handler with whether it hit the mask.
    pub fn click(&mut self, px: f64, py: f64) -> bool {
        let masked = is_masked(&self.bounds(), px, py);
        debug!(px, py, masked, "mask click");
        for source in self.sources.values_mut() {
            if let Some(handler) = source.on_click.as_mut() {
                handler(masked);
            }
        }
        masked
    }
}
