//! Render surface seam: the actors the core places in a scene and the
//! trait a windowing backend implements to display them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use image::RgbImage;
use shared::{Bounds, Color, PolyData, Representation, BLACK, YELLOW};

use crate::geometry::GlyphSet;

/// Opaque handle for an actor placed on a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorHandle(u64);

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Appearance of a geometry actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayStyle {
    pub color: Color,
    pub representation: Representation,
    pub edge_color: Color,
    pub line_width: f32,
    pub point_size: f32,
}

impl DisplayStyle {
    pub fn new(color: Color, representation: Representation) -> Self {
        Self {
            color,
            representation,
            ..Default::default()
        }
    }
}

impl Default for DisplayStyle {
    fn default() -> Self {
        Self {
            color: YELLOW,
            representation: Representation::Surface,
            edge_color: BLACK,
            line_width: 1.0,
            point_size: 10.0,
        }
    }
}

/// Flat quad spanned by `origin`, `point1` and `point2` (VTK plane source convention)
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneActor {
    pub origin: DVec3,
    pub point1: DVec3,
    pub point2: DVec3,
    pub color: Color,
    pub edge_color: Color,
    pub line_width: f32,
}

impl PlaneActor {
    /// Corners in winding order: origin, point1, opposite corner, point2
    pub fn corners(&self) -> [DVec3; 4] {
        [
            self.origin,
            self.point1,
            self.point1 + self.point2 - self.origin,
            self.point2,
        ]
    }
}

/// Where the axis annotation draws its three axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlyMode {
    #[default]
    OuterEdges,
    ClosestTriad,
}

/// Bounding-box axis annotation. It is rendered against whatever camera is
/// active when the frame is drawn, so it follows the viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeAxes {
    pub bounds: Bounds,
    pub fly_mode: FlyMode,
    pub label_precision: usize,
    pub label_width: usize,
    pub font_factor: f32,
    pub label_color: Color,
    pub label_shadow: bool,
}

impl CubeAxes {
    pub fn label(&self, value: f64) -> String {
        format_g(value, self.label_precision, self.label_width)
    }
}

/// Screen corner used by text annotations (VTK corner indices)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub corner: Corner,
    pub text: String,
    pub max_font_size: f32,
    pub color: Color,
}

/// Anything the core can place in a scene
#[derive(Debug, Clone)]
pub enum Actor {
    Geometry {
        polydata: Arc<PolyData>,
        style: DisplayStyle,
    },
    Glyphs(GlyphSet),
    Plane(PlaneActor),
    CubeAxes(CubeAxes),
    Text(TextAnnotation),
    /// Axes triad pinned to a viewport corner
    OrientationMarker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Geometry,
    Glyphs,
    Plane,
    CubeAxes,
    Text,
    OrientationMarker,
}

impl Actor {
    pub fn kind(&self) -> ActorKind {
        match self {
            Actor::Geometry { .. } => ActorKind::Geometry,
            Actor::Glyphs(_) => ActorKind::Glyphs,
            Actor::Plane(_) => ActorKind::Plane,
            Actor::CubeAxes(_) => ActorKind::CubeAxes,
            Actor::Text(_) => ActorKind::Text,
            Actor::OrientationMarker => ActorKind::OrientationMarker,
        }
    }

    /// World-space extent, `None` for screen-space actors
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Actor::Geometry { polydata, .. } => polydata.bounds(),
            Actor::Glyphs(glyphs) => glyphs.bounds(),
            Actor::Plane(plane) => bounds_of(plane.corners().iter().copied()),
            Actor::CubeAxes(axes) => Some(axes.bounds),
            Actor::Text(_) | Actor::OrientationMarker => None,
        }
    }
}

pub(crate) fn bounds_of(points: impl IntoIterator<Item = DVec3>) -> Option<Bounds> {
    let pd = PolyData {
        points: points.into_iter().map(|p| p.to_array()).collect(),
        ..Default::default()
    };
    pd.bounds()
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("render surface unavailable: {0}")]
    Unavailable(String),
    #[error("frame capture failed: {0}")]
    Capture(String),
    #[error("render surface already released")]
    Released,
}

/// Windowing/rendering backend consumed by the viewer core.
///
/// Window creation happens when the backend is constructed (see
/// `ViewerSession::open`). Key events are not pulled through this trait:
/// backends hand them to `InteractionController::run_event_loop`.
pub trait RenderSurface {
    fn add_actor(&mut self, actor: Actor) -> ActorHandle;

    /// Returns `false` when the handle is unknown
    fn remove_actor(&mut self, handle: ActorHandle) -> bool;

    /// Returns `false` when the handle is unknown
    fn set_actor_visible(&mut self, handle: ActorHandle, visible: bool) -> bool;

    /// `None` when the handle is unknown
    fn actor_visible(&self, handle: ActorHandle) -> Option<bool>;

    fn request_render(&mut self);

    fn reset_camera(&mut self);

    fn capture_frame(&mut self) -> Result<RgbImage, SurfaceError>;

    /// Release the window and its interactor. Called exactly once per session.
    fn release(&mut self);
}

#[derive(Debug, Clone)]
pub struct ActorEntry {
    pub actor: Actor,
    pub visible: bool,
}

/// Retained actor list shared by the backends
#[derive(Debug, Default)]
pub struct ActorStore {
    next_handle: u64,
    entries: BTreeMap<ActorHandle, ActorEntry>,
}

impl ActorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Actor) -> ActorHandle {
        let handle = ActorHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(
            handle,
            ActorEntry {
                actor,
                visible: true,
            },
        );
        handle
    }

    pub fn remove(&mut self, handle: ActorHandle) -> Option<Actor> {
        self.entries.remove(&handle).map(|e| e.actor)
    }

    pub fn set_visible(&mut self, handle: ActorHandle, visible: bool) -> bool {
        match self.entries.get_mut(&handle) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&ActorEntry> {
        self.entries.get(&handle)
    }

    /// Switch every geometry actor to `representation`. Returns the actors
    /// that changed, which a backend has to tessellate again.
    pub fn set_representation(&mut self, representation: Representation) -> Vec<ActorHandle> {
        self.entries
            .iter_mut()
            .filter_map(|(handle, entry)| match &mut entry.actor {
                Actor::Geometry { style, .. } if style.representation != representation => {
                    style.representation = representation;
                    Some(*handle)
                }
                _ => None,
            })
            .collect()
    }

    pub fn is_visible(&self, handle: ActorHandle) -> Option<bool> {
        self.entries.get(&handle).map(|e| e.visible)
    }

    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &ActorEntry)> {
        self.entries.iter().map(|(h, e)| (*h, e))
    }

    pub fn count(&self, kind: ActorKind) -> usize {
        self.entries
            .values()
            .filter(|e| e.actor.kind() == kind)
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Union of the world bounds of all visible actors
    pub fn visible_bounds(&self) -> Option<Bounds> {
        self.entries
            .values()
            .filter(|e| e.visible)
            .filter_map(|e| e.actor.bounds())
            .reduce(|a, b| a.union(&b))
    }
}

/// printf-style `%<width>.<precision>g` formatting
pub fn format_g(value: f64, precision: usize, width: usize) -> String {
    let precision = precision.max(1);
    let body = if value == 0.0 || !value.is_finite() {
        format!("{}", value)
    } else {
        let sci = format!("{:.*e}", precision - 1, value);
        let (mantissa, exp) = match sci.split_once('e') {
            Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
            None => (sci.clone(), 0),
        };
        if exp < -4 || exp >= precision as i32 {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", trim_fraction(&mantissa), sign, exp.abs())
        } else {
            let decimals = (precision as i32 - 1 - exp).max(0) as usize;
            trim_fraction(&format!("{:.*}", decimals, value))
        }
    };
    format!("{:>width$}", body, width = width)
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}
