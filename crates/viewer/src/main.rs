mod app;
mod viewport;

use std::path::Path;

use app::ViewerApp;
use mmviewer_lib::fixtures;
use mmviewer_lib::ViewerSettings;
use shared::{SceneFile, SceneObject};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mmviewer=info,mmviewer_lib=info".into()),
        )
        .init();

    let settings = ViewerSettings::load();

    // Parse --mesh <path> argument, fall back to a demo cube
    let scene = parse_mesh_arg().unwrap_or_else(demo_scene);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.window.title.clone())
            .with_inner_size([settings.window.width as f32, settings.window.height as f32])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "mmviewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, settings, scene)?))),
    ) {
        tracing::error!("Failed to start viewer: {e}");
    }
}

fn parse_mesh_arg() -> Option<SceneFile> {
    let args: Vec<String> = std::env::args().collect();
    let i = args.iter().position(|a| a == "--mesh")?;
    let Some(path) = args.get(i + 1) else {
        tracing::error!("--mesh expects a path");
        return None;
    };
    load_scene(Path::new(path))
}

fn load_scene(path: &Path) -> Option<SceneFile> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read mesh file {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str::<SceneFile>(&json) {
        Ok(scene) => {
            tracing::info!("Loaded {} ({} objects)", path.display(), scene.objects.len());
            Some(scene)
        }
        Err(e) => {
            tracing::error!("Failed to parse mesh JSON from {}: {e}", path.display());
            None
        }
    }
}

fn demo_scene() -> SceneFile {
    SceneFile {
        objects: vec![SceneObject {
            geometry: fixtures::floating_box(4.0, 2.0, 1.0),
            color: shared::YELLOW,
            representation: Default::default(),
        }],
    }
}
