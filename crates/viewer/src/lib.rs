// Library crate: the viewer core (registry, overlays, key dispatch, export)
// and a headless surface for tests. The eframe/glow backend stays in the binary crate.

pub mod adapter;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod legend;
pub mod overlay;
pub mod registry;
pub mod session;

pub use adapter::{Actor, ActorHandle, DisplayStyle, RenderSurface, SurfaceError};
pub use config::ViewerSettings;
pub use controller::{Action, Command, InteractionController, KeyEvent, LoopExit};
pub use error::{Result, ViewerError};
pub use overlay::{OverlayKind, OverlayState};
pub use registry::GeometryId;
pub use session::ViewerSession;
