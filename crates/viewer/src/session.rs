//! Viewer session: the render surface, the geometry registry and the
//! settings, owned together and released together.

use std::path::PathBuf;

use glam::DVec3;
use shared::{Color, Point3, PolyData, Representation};

use crate::adapter::{Actor, ActorHandle, DisplayStyle, RenderSurface, SurfaceError};
use crate::config::{ArrowShape, ViewerSettings, WindowSettings};
use crate::error::Result;
use crate::export;
use crate::geometry::GlyphSet;
use crate::legend;
use crate::registry::{GeometryId, GeometryRegistry};

/// One interactive viewing session.
///
/// The surface is acquired in [`ViewerSession::open`] and released exactly
/// once, either by [`ViewerSession::close`] or when the session is dropped.
pub struct ViewerSession<S: RenderSurface> {
    surface: S,
    registry: GeometryRegistry,
    settings: ViewerSettings,
    closed: bool,
}

impl<S: RenderSurface> ViewerSession<S> {
    /// Acquire the surface through `create_window` and place the static
    /// annotations. A surface failure aborts construction.
    pub fn open<F>(settings: ViewerSettings, create_window: F) -> Result<Self>
    where
        F: FnOnce(&WindowSettings) -> std::result::Result<S, SurfaceError>,
    {
        let surface = create_window(&settings.window)?;
        let mut session = Self {
            surface,
            registry: GeometryRegistry::new(),
            settings,
            closed: false,
        };
        session.add_annotations();
        tracing::info!(
            "Opened viewer session '{}' ({}x{})",
            session.settings.window.title,
            session.settings.window.width,
            session.settings.window.height
        );
        Ok(session)
    }

    fn add_annotations(&mut self) {
        self.surface.add_actor(Actor::OrientationMarker);
        self.surface.add_actor(Actor::Text(legend::help_annotation()));
        self.surface
            .add_actor(Actor::Text(legend::copyright_annotation(legend::current_year())));
    }

    pub fn registry(&self) -> &GeometryRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Register geometry drawn with `color` and `representation`
    pub fn add_geometry(
        &mut self,
        polydata: PolyData,
        color: Color,
        representation: Representation,
    ) -> Result<GeometryId> {
        self.add_polydata(polydata, DisplayStyle::new(color, representation))
    }

    pub fn add_polydata(&mut self, polydata: PolyData, style: DisplayStyle) -> Result<GeometryId> {
        self.registry.add(&mut self.surface, polydata, style)
    }

    /// Register a single vertex
    pub fn add_point(&mut self, position: Point3, color: Color) -> Result<GeometryId> {
        self.add_geometry(PolyData::point(position), color, Representation::Surface)
    }

    /// Register a line segment
    pub fn add_line(&mut self, p0: Point3, p1: Point3, color: Color) -> Result<GeometryId> {
        self.add_geometry(PolyData::line(p0, p1), color, Representation::Surface)
    }

    /// Place an arrow at `point` along `value / scale`. The arrow is a
    /// plain actor and is not part of the registry.
    pub fn add_vector(&mut self, point: Point3, value: Point3, scale: f64, color: Color) -> ActorHandle {
        let glyphs = GlyphSet::vector(
            DVec3::from_array(point),
            DVec3::from_array(value),
            scale,
            ArrowShape::VECTOR,
            color,
        );
        self.surface.add_actor(Actor::Glyphs(glyphs))
    }

    /// Replace the display binding of a registered object
    pub fn restyle(&mut self, id: GeometryId, style: DisplayStyle) -> Result<ActorHandle> {
        let handle = self.registry.restyle(&mut self.surface, id, style)?;
        self.surface.request_render();
        Ok(handle)
    }

    /// Frame the scene and draw it, ready for the event loop
    pub fn show(&mut self) {
        self.surface.reset_camera();
        self.surface.request_render();
    }

    /// Write every registered object to the save file
    pub fn save_geometry(&self) -> Result<PathBuf> {
        let path = self.settings.output.save_path();
        export::write_vtp(&path, self.registry.iter().map(|o| o.polydata()))?;
        tracing::info!(
            "File '{}' written in {}",
            self.settings.output.save_file_name,
            self.settings.output.directory().display()
        );
        Ok(path)
    }

    /// Capture the current frame to the screenshot file
    pub fn screenshot(&mut self) -> Result<PathBuf> {
        let path = self.settings.output.screenshot_path();
        let frame = self.surface.capture_frame()?;
        export::write_png(&path, &frame)?;
        tracing::info!(
            "File '{}' written in {}",
            self.settings.output.screenshot_file_name,
            self.settings.output.directory().display()
        );
        Ok(path)
    }

    /// Release the surface. Further calls are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.surface.release();
        tracing::info!("Viewer session closed");
    }
}

impl<S: RenderSurface> Drop for ViewerSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: RenderSurface> std::fmt::Debug for ViewerSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerSession")
            .field("geometry", &self.registry.len())
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ActorKind;
    use crate::fixtures;
    use crate::harness::{headless_session, RecordingSurface};
    use shared::BLACK;

    #[test]
    fn test_open_places_annotations() {
        let session = headless_session().unwrap();
        assert_eq!(session.surface().count(ActorKind::Text), 2);
        assert_eq!(session.surface().count(ActorKind::OrientationMarker), 1);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_open_fails_without_surface() {
        let result = ViewerSession::<RecordingSurface>::open(ViewerSettings::default(), |_| {
            Err(SurfaceError::Unavailable("no display".into()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_close_releases_once() {
        let mut session = headless_session().unwrap();
        let counter = session.surface().release_counter();
        session.close();
        session.close();
        assert!(session.is_closed());
        drop(session);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let session = headless_session().unwrap();
        let counter = session.surface().release_counter();
        drop(session);
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_points_lines_vectors() {
        let mut session = headless_session().unwrap();
        let p = session.add_point([1.0, 2.0, 3.0], BLACK).unwrap();
        let l = session
            .add_line([0.0; 3], [1.0, 1.0, 1.0], [1.0, 0.0, 0.0])
            .unwrap();
        assert_eq!((p, l), (GeometryId(0), GeometryId(1)));

        session.add_vector([0.0; 3], [0.0, 0.0, 9.81], 1.0, BLACK);
        assert_eq!(session.surface().count(ActorKind::Geometry), 2);
        assert_eq!(session.surface().count(ActorKind::Glyphs), 1);
        assert_eq!(session.registry().len(), 2);
    }

    #[test]
    fn test_show_resets_camera() {
        let mut session = headless_session().unwrap();
        session
            .add_geometry(fixtures::cube(1.0), [1.0, 1.0, 0.0], Representation::Surface)
            .unwrap();
        session.show();
        assert_eq!(session.surface().camera_reset_count(), 1);
        assert_eq!(session.surface().render_count(), 1);
    }

    #[test]
    fn test_screenshot_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ViewerSettings::default().with_output_dir(dir.path());
        let mut session = crate::harness::headless_session_with(settings).unwrap();
        session.close();
        assert!(session.screenshot().is_err());
        assert!(!dir.path().join("screenshot.png").exists());
    }
}
