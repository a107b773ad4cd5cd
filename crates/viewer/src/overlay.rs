//! Toggleable visual aids derived from the registered geometry: face
//! normals, a bounding-box axes annotation and a reference plane at z=0.
//!
//! Every overlay kind is either fully hidden (no actors) or fully shown.
//! Showing builds every actor before any of them reaches the surface, and
//! hiding removes every actor before the state flips back, so a failed or
//! repeated toggle can never leave a partial set behind.

use std::fmt;

use glam::DVec3;
use shared::BLACK;

use crate::adapter::{Actor, ActorHandle, CubeAxes, PlaneActor, RenderSurface};
use crate::config::OverlaySettings;
use crate::error::Result;
use crate::geometry::GlyphSet;
use crate::registry::GeometryRegistry;
use crate::session::ViewerSession;

const NORMAL_GLYPH_COLOR: shared::Color = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Normals,
    BoundingAxes,
    ReferencePlane,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverlayKind::Normals => "normals",
            OverlayKind::BoundingAxes => "bounding axes",
            OverlayKind::ReferencePlane => "reference plane",
        };
        f.write_str(name)
    }
}

/// Visibility of one overlay kind together with the actors that realise it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Hidden,
    Shown(Vec<ActorHandle>),
}

impl OverlayState {
    pub fn is_shown(&self) -> bool {
        matches!(self, OverlayState::Shown(_))
    }

    pub fn actors(&self) -> &[ActorHandle] {
        match self {
            OverlayState::Hidden => &[],
            OverlayState::Shown(handles) => handles,
        }
    }
}

/// Owns the three overlay states and the parameters used to build them
#[derive(Debug, Default)]
pub struct OverlayManager {
    settings: OverlaySettings,
    normals: OverlayState,
    axes: OverlayState,
    plane: OverlayState,
}

impl OverlayManager {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn state(&self, kind: OverlayKind) -> &OverlayState {
        match kind {
            OverlayKind::Normals => &self.normals,
            OverlayKind::BoundingAxes => &self.axes,
            OverlayKind::ReferencePlane => &self.plane,
        }
    }

    pub fn is_shown(&self, kind: OverlayKind) -> bool {
        self.state(kind).is_shown()
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    /// Show or hide `kind`. Returns the new visibility.
    pub fn toggle<S: RenderSurface>(
        &mut self,
        session: &mut ViewerSession<S>,
        kind: OverlayKind,
    ) -> Result<bool> {
        match kind {
            OverlayKind::Normals => self.toggle_normals(session),
            OverlayKind::BoundingAxes => self.toggle_axes(session),
            OverlayKind::ReferencePlane => self.toggle_reference_plane(session),
        }
    }

    /// One arrow glyph actor per registered object, anchored at face centroids
    pub fn toggle_normals<S: RenderSurface>(&mut self, session: &mut ViewerSession<S>) -> Result<bool> {
        let settings = &self.settings;
        toggle_with(&mut self.normals, session, |registry| {
            registry.first()?;
            Ok(registry
                .iter()
                .map(|object| {
                    Actor::Glyphs(GlyphSet::face_normals(
                        object.polydata(),
                        settings.normal_glyph_scale,
                        settings.normal_arrow,
                        NORMAL_GLYPH_COLOR,
                    ))
                })
                .collect())
        })
    }

    /// Axes annotation around the first object only, drawn against the active camera
    pub fn toggle_axes<S: RenderSurface>(&mut self, session: &mut ViewerSession<S>) -> Result<bool> {
        let settings = &self.settings;
        toggle_with(&mut self.axes, session, |registry| {
            let bounds = registry.bounds()?;
            Ok(vec![Actor::CubeAxes(CubeAxes {
                bounds,
                fly_mode: settings.axes_fly_mode,
                label_precision: settings.axes_label_precision,
                label_width: settings.axes_label_width,
                font_factor: settings.axes_font_factor,
                label_color: BLACK,
                label_shadow: true,
            })])
        })
    }

    /// Rectangle at z=0 covering the first object's x/y extent plus the margin
    pub fn toggle_reference_plane<S: RenderSurface>(
        &mut self,
        session: &mut ViewerSession<S>,
    ) -> Result<bool> {
        let settings = &self.settings;
        toggle_with(&mut self.plane, session, |registry| {
            Ok(vec![Actor::Plane(reference_plane(registry, settings)?)])
        })
    }
}

/// Flip `state`. When showing, `build` produces every actor up front; an
/// error leaves the state hidden and the surface untouched.
fn toggle_with<S, F>(state: &mut OverlayState, session: &mut ViewerSession<S>, build: F) -> Result<bool>
where
    S: RenderSurface,
    F: FnOnce(&GeometryRegistry) -> Result<Vec<Actor>>,
{
    if state.is_shown() {
        remove_all(state, session.surface_mut());
        session.surface_mut().request_render();
        return Ok(false);
    }

    let actors = build(session.registry())?;
    let surface = session.surface_mut();
    let handles = actors.into_iter().map(|a| surface.add_actor(a)).collect();
    *state = OverlayState::Shown(handles);
    surface.request_render();
    Ok(true)
}

fn remove_all<S: RenderSurface + ?Sized>(state: &mut OverlayState, surface: &mut S) {
    if let OverlayState::Shown(handles) = state {
        for handle in handles.drain(..) {
            if !surface.remove_actor(handle) {
                tracing::debug!("Overlay {handle} was already gone from the surface");
            }
        }
    }
    *state = OverlayState::Hidden;
}

/// Plane corners follow the VTK plane source layout:
/// origin at (xmin, ymax), point1 at (xmin, ymin), point2 at (xmax, ymax).
pub fn reference_plane(registry: &GeometryRegistry, settings: &OverlaySettings) -> Result<PlaneActor> {
    let b = registry.bounds()?;
    let dx = settings.plane_margin * (b.xmax - b.xmin);
    let dy = settings.plane_margin * (b.ymax - b.ymin);

    Ok(PlaneActor {
        origin: DVec3::new(b.xmin - dx, b.ymax + dy, 0.0),
        point1: DVec3::new(b.xmin - dx, b.ymin - dy, 0.0),
        point2: DVec3::new(b.xmax + dx, b.ymax + dy, 0.0),
        color: settings.plane_color,
        edge_color: BLACK,
        line_width: 1.0,
    })
}
