//! Main application module

mod keyboard;

use eframe::egui;
use mmviewer_lib::controller::{InteractionController, LoopExit};
use mmviewer_lib::session::ViewerSession;
use mmviewer_lib::ViewerSettings;
use shared::SceneFile;

use crate::viewport::GlSurface;

/// eframe application hosting one viewer session
pub struct ViewerApp {
    session: ViewerSession<GlSurface>,
    controller: InteractionController,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: ViewerSettings,
        scene: SceneFile,
    ) -> mmviewer_lib::Result<Self> {
        let controller = InteractionController::new(settings.overlays.clone());
        let mut session = ViewerSession::open(settings, |window| GlSurface::new(cc, window))?;

        for (k, object) in scene.objects.into_iter().enumerate() {
            if let Err(e) = session.add_geometry(object.geometry, object.color, object.representation) {
                tracing::warn!("Skipping scene object {k}: {e}");
            }
        }
        session.show();

        Ok(Self { session, controller })
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let events = keyboard::collect_key_events(ctx);
        if self.controller.run_event_loop(&mut self.session, events) == LoopExit::Closed {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.session.surface_mut().show(ui);
            });

        if self.session.surface_mut().take_repaint() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        // GL objects must go while the context is still alive
        self.session.close();
    }
}
