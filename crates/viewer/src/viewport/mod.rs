//! 3D viewport: the eframe/glow render surface

mod annotations;
mod camera;
mod gl_renderer;
mod mesh;

use std::sync::{Arc, Mutex};

use egui::Ui;
use image::RgbImage;
use mmviewer_lib::adapter::{Actor, ActorHandle, ActorStore, RenderSurface, SurfaceError};
use mmviewer_lib::config::WindowSettings;
use shared::Representation;

use camera::ArcBallCamera;
use gl_renderer::GlRenderer;

/// Render surface drawing into an egui central panel through glow.
///
/// World-space actors are uploaded to the GPU as soon as they are added;
/// screen-space actors are painted with egui each frame.
pub struct GlSurface {
    gl: Arc<glow::Context>,
    renderer: Option<Arc<Mutex<GlRenderer>>>,
    store: ActorStore,
    camera: ArcBallCamera,
    background: [f32; 3],
    /// Last viewport size in physical pixels, used for captures
    frame_size: (u32, u32),
    repaint: bool,
}

impl GlSurface {
    pub fn new(cc: &eframe::CreationContext<'_>, window: &WindowSettings) -> Result<Self, SurfaceError> {
        let gl = cc
            .gl
            .clone()
            .ok_or_else(|| SurfaceError::Unavailable("eframe was not started with the glow backend".into()))?;
        let renderer = GlRenderer::new(&gl).map_err(SurfaceError::Unavailable)?;

        Ok(Self {
            gl,
            renderer: Some(Arc::new(Mutex::new(renderer))),
            store: ActorStore::new(),
            camera: ArcBallCamera::new(),
            background: window.background.map(|c| c as f32),
            frame_size: (window.width, window.height),
            repaint: true,
        })
    }

    /// Whether a render was requested since the last call
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.repaint)
    }

    fn visible_world_actors(&self) -> Vec<ActorHandle> {
        self.store
            .iter()
            .filter(|(_, e)| e.visible && mesh_backed(&e.actor))
            .map(|(h, _)| h)
            .collect()
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        self.handle_camera(ui, &response, rect);

        if !ui.is_rect_visible(rect) {
            return;
        }
        let ppp = ui.ctx().pixels_per_point();
        self.frame_size = (
            (rect.width() * ppp).round() as u32,
            (rect.height() * ppp).round() as u32,
        );

        self.render_gl(ui, rect);
        self.draw_annotations(ui, rect);
    }

    fn handle_camera(&mut self, ui: &Ui, response: &egui::Response, rect: egui::Rect) {
        let ctrl = ui.input(|i| i.modifiers.ctrl);

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            match response.interact_pointer_pos() {
                Some(pos) if ctrl => {
                    let from = pos - delta - rect.center();
                    let to = pos - rect.center();
                    self.camera.spin(to.angle() - from.angle());
                }
                _ => self.camera.rotate(delta.x * 0.5, delta.y * 0.5),
            }
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.zoom(-delta.y * 0.01);
        }

        if response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_delta();
            self.camera.pan(delta.x / rect.height(), delta.y / rect.height());
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                self.camera.zoom(scroll * 0.01);
            }
        }

        let pressed = |key: egui::Key| ui.input(|i| i.key_pressed(key) && i.modifiers.is_none());
        if pressed(egui::Key::R) {
            self.reset_camera();
        }
        if pressed(egui::Key::F) {
            if let Some(point) = response
                .hover_pos()
                .and_then(|pos| self.camera.unproject_at_target_depth(pos, rect))
            {
                self.camera.focus(point);
            }
        }
        if pressed(egui::Key::S) {
            self.set_representation(Representation::Surface);
        }
        if pressed(egui::Key::W) {
            self.set_representation(Representation::Wireframe);
        }
    }

    /// Redraw every geometry actor as a surface or as a wireframe
    fn set_representation(&mut self, representation: Representation) {
        let changed = self.store.set_representation(representation);
        tracing::debug!("{} geometry actors drawn as {representation:?}", changed.len());
        for handle in changed {
            if let Some(entry) = self.store.get(handle) {
                self.upload(handle, &entry.actor);
            }
        }
        self.repaint = true;
    }

    fn upload(&self, handle: ActorHandle, actor: &Actor) {
        let (Some(batch), Some(renderer)) = (mesh::tessellate(actor), &self.renderer) else {
            return;
        };
        if let Ok(mut r) = renderer.lock() {
            if let Err(e) = r.upload(&self.gl, handle, &batch) {
                tracing::error!("Failed to upload {handle}: {e}");
            }
        }
    }

    fn render_gl(&self, ui: &mut Ui, rect: egui::Rect) {
        let Some(renderer) = self.renderer.clone() else {
            return;
        };
        let camera = self.camera;
        let bg_color = self.background;
        let visible = self.visible_world_actors();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let clip = info.clip_rect_in_pixels();
                let params = gl_renderer::RenderParams {
                    viewport: [
                        clip.left_px as f32,
                        clip.from_bottom_px as f32,
                        clip.width_px as f32,
                        clip.height_px as f32,
                    ],
                    bg_color,
                };
                if let Ok(r) = renderer.lock() {
                    r.paint(painter.gl(), &camera, &params, &visible);
                }
            })),
        };
        ui.painter().add(callback);
    }

    fn draw_annotations(&self, ui: &Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        for (_, entry) in self.store.iter().filter(|(_, e)| e.visible) {
            match &entry.actor {
                Actor::Text(text) => annotations::draw_text(&painter, rect, text),
                Actor::CubeAxes(axes) => annotations::draw_cube_axes(&painter, rect, &self.camera, axes),
                Actor::OrientationMarker => annotations::draw_orientation_marker(&painter, rect, &self.camera),
                Actor::Geometry { .. } | Actor::Glyphs(_) | Actor::Plane(_) => {}
            }
        }
    }
}

fn mesh_backed(actor: &Actor) -> bool {
    matches!(actor, Actor::Geometry { .. } | Actor::Glyphs(_) | Actor::Plane(_))
}

impl RenderSurface for GlSurface {
    fn add_actor(&mut self, actor: Actor) -> ActorHandle {
        let handle = self.store.insert(actor);
        if let Some(entry) = self.store.get(handle) {
            self.upload(handle, &entry.actor);
        }
        handle
    }

    fn remove_actor(&mut self, handle: ActorHandle) -> bool {
        if let Some(renderer) = &self.renderer {
            if let Ok(mut r) = renderer.lock() {
                r.remove(&self.gl, handle);
            }
        }
        self.store.remove(handle).is_some()
    }

    fn set_actor_visible(&mut self, handle: ActorHandle, visible: bool) -> bool {
        self.store.set_visible(handle, visible)
    }

    fn actor_visible(&self, handle: ActorHandle) -> Option<bool> {
        self.store.is_visible(handle)
    }

    fn request_render(&mut self) {
        self.repaint = true;
    }

    fn reset_camera(&mut self) {
        self.camera = match self.store.visible_bounds() {
            Some(bounds) => ArcBallCamera::framing(&bounds),
            None => ArcBallCamera::new(),
        };
        self.repaint = true;
    }

    fn capture_frame(&mut self) -> Result<RgbImage, SurfaceError> {
        let renderer = self.renderer.as_ref().ok_or(SurfaceError::Released)?;
        let r = renderer
            .lock()
            .map_err(|_| SurfaceError::Capture("renderer lock poisoned".into()))?;
        r.capture(
            &self.gl,
            &self.camera,
            self.frame_size,
            self.background,
            &self.visible_world_actors(),
        )
        .map_err(SurfaceError::Capture)
    }

    fn release(&mut self) {
        if let Some(renderer) = self.renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.destroy(&self.gl);
            }
        }
        self.store.clear();
    }
}
