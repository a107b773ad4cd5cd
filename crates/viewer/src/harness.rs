//! Headless render surface for tests and scripted sessions.
//!
//! `RecordingSurface` keeps the retained actor list like a real backend but
//! draws nothing. It counts renders, camera resets and releases so that
//! tests can assert on the side effects of key commands.

use std::cell::Cell;
use std::rc::Rc;

use image::{Rgb, RgbImage};
use shared::Color;

use crate::adapter::{Actor, ActorHandle, ActorKind, ActorStore, RenderSurface, SurfaceError};
use crate::config::{ViewerSettings, WindowSettings};
use crate::controller::{InteractionController, KeyEvent, LoopExit};
use crate::error::Result;
use crate::session::ViewerSession;

/// Headless surface: retained actors, counters and a solid-color frame
#[derive(Debug)]
pub struct RecordingSurface {
    store: ActorStore,
    frame_size: (u32, u32),
    background: Color,
    renders: usize,
    camera_resets: usize,
    releases: Rc<Cell<usize>>,
    released: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::with_window(&WindowSettings::default())
    }

    /// Surface sized and colored like the configured window
    pub fn with_window(window: &WindowSettings) -> Self {
        Self {
            store: ActorStore::new(),
            frame_size: (window.width, window.height),
            background: window.background,
            renders: 0,
            camera_resets: 0,
            releases: Rc::new(Cell::new(0)),
            released: false,
        }
    }

    pub fn store(&self) -> &ActorStore {
        &self.store
    }

    pub fn count(&self, kind: ActorKind) -> usize {
        self.store.count(kind)
    }

    /// Actors of `kind` in insertion order
    pub fn actors(&self, kind: ActorKind) -> Vec<&Actor> {
        self.store
            .iter()
            .filter(|(_, e)| e.actor.kind() == kind)
            .map(|(_, e)| &e.actor)
            .collect()
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn camera_reset_count(&self) -> usize {
        self.camera_resets
    }

    pub fn release_count(&self) -> usize {
        self.releases.get()
    }

    /// Counter that outlives the surface, for checking release on drop
    pub fn release_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.releases)
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn add_actor(&mut self, actor: Actor) -> ActorHandle {
        self.store.insert(actor)
    }

    fn remove_actor(&mut self, handle: ActorHandle) -> bool {
        self.store.remove(handle).is_some()
    }

    fn set_actor_visible(&mut self, handle: ActorHandle, visible: bool) -> bool {
        self.store.set_visible(handle, visible)
    }

    fn actor_visible(&self, handle: ActorHandle) -> Option<bool> {
        self.store.is_visible(handle)
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn reset_camera(&mut self) {
        self.camera_resets += 1;
    }

    fn capture_frame(&mut self) -> std::result::Result<RgbImage, SurfaceError> {
        if self.released {
            return Err(SurfaceError::Released);
        }
        let (w, h) = self.frame_size;
        let px = self.background.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        Ok(RgbImage::from_pixel(w, h, Rgb(px)))
    }

    fn release(&mut self) {
        self.released = true;
        self.store.clear();
        self.releases.set(self.releases.get() + 1);
    }
}

/// Open a headless session with default settings
pub fn headless_session() -> Result<ViewerSession<RecordingSurface>> {
    headless_session_with(ViewerSettings::default())
}

pub fn headless_session_with(settings: ViewerSettings) -> Result<ViewerSession<RecordingSurface>> {
    ViewerSession::open(settings, |window| Ok(RecordingSurface::with_window(window)))
}

/// Feed a string of key presses through a controller, one char per event
pub fn type_keys(
    controller: &mut InteractionController,
    session: &mut ViewerSession<RecordingSurface>,
    keys: &str,
) -> LoopExit {
    controller.run_event_loop(session, keys.chars().map(KeyEvent::Char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_uses_background() {
        let mut s = RecordingSurface::new();
        let img = s.capture_frame().unwrap();
        assert_eq!(img.dimensions(), (1024, 768));
        assert_eq!(img.get_pixel(0, 0).0, [197, 208, 255]);
    }

    #[test]
    fn test_release_clears_and_counts() {
        let mut s = RecordingSurface::new();
        s.add_actor(Actor::OrientationMarker);
        s.release();
        assert!(s.store().is_empty());
        assert_eq!(s.release_count(), 1);
        assert!(matches!(s.capture_frame(), Err(SurfaceError::Released)));
    }
}
