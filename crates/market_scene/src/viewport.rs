//! Viewport size tracking and the resize listener of a live generation.

use crate::backend::RenderBackend;
use crate::camera::Camera;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Registry of active resize subscriptions.
#[derive(Debug, Default)]
pub struct ResizeListeners {
    next_id: u64,
    active: BTreeSet<ListenerId>,
}

impl ResizeListeners {
    pub fn subscribe(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.insert(id);
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.active.remove(&id)
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.active.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Keeps the camera projection and the drawing surface in sync with the
/// viewport while registered.
#[derive(Debug, Default)]
pub struct ViewportController {
    listener: Option<ListenerId>,
    applied: Option<Viewport>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listeners: &mut ResizeListeners) {
        if self.listener.is_none() {
            self.listener = Some(listeners.subscribe());
        }
    }

    /// Removes the subscription. Only the first call has an effect.
    pub fn unregister(&mut self, listeners: &mut ResizeListeners) -> bool {
        match self.listener.take() {
            Some(id) => listeners.unsubscribe(id),
            None => false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.listener.is_some()
    }

    pub fn applied(&self) -> Option<Viewport> {
        self.applied
    }

    /// Recomputes the camera aspect and resizes the surface. Reapplying the
    /// same size is harmless. Returns `false` if not subscribed or the
    /// viewport is empty (minimised window).
    pub fn on_resize<B: RenderBackend + ?Sized>(
        &mut self,
        viewport: Viewport,
        listeners: &ResizeListeners,
        camera: &mut Camera,
        backend: &mut B,
    ) -> bool {
        let subscribed = self.listener.is_some_and(|id| listeners.is_subscribed(id));
        if !subscribed || viewport.is_empty() {
            return false;
        }

        camera.set_aspect(viewport.aspect());
        backend.resize(viewport);
        self.applied = Some(viewport);
        true
    }
}
