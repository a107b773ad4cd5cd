//! Ordered store of the geometry objects shown by the viewer.

use std::fmt;
use std::sync::Arc;

use shared::{Bounds, PolyData};

use crate::adapter::{Actor, ActorHandle, DisplayStyle, RenderSurface};
use crate::error::{Result, ViewerError};
use crate::geometry;

/// Dense insertion index of a geometry object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId(pub usize);

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable payload plus its current display binding
#[derive(Debug, Clone)]
pub struct GeometryObject {
    id: GeometryId,
    polydata: Arc<PolyData>,
    bounds: Bounds,
    style: DisplayStyle,
    actor: ActorHandle,
}

impl GeometryObject {
    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn polydata(&self) -> &PolyData {
        &self.polydata
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn style(&self) -> &DisplayStyle {
        &self.style
    }

    /// Actor currently displaying this object
    pub fn actor(&self) -> ActorHandle {
        self.actor
    }
}

/// Geometry objects in insertion order. Ids are `0..len()` and never reused:
/// objects cannot be removed during a session, only hidden.
#[derive(Debug, Default)]
pub struct GeometryRegistry {
    objects: Vec<GeometryObject>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `polydata`, create its actor and append it.
    ///
    /// Invalid input is rejected before anything reaches the surface.
    pub fn add<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        polydata: PolyData,
        style: DisplayStyle,
    ) -> Result<GeometryId> {
        geometry::validate(&polydata)?;
        let bounds = polydata
            .bounds()
            .ok_or_else(|| ViewerError::InvalidGeometry("geometry has no points".into()))?;

        let id = GeometryId(self.objects.len());
        let polydata = Arc::new(polydata);
        let actor = surface.add_actor(Actor::Geometry {
            polydata: Arc::clone(&polydata),
            style,
        });
        tracing::debug!(
            "Registered geometry {id} ({} points, {} cells) as {actor}",
            polydata.points.len(),
            polydata.cell_count()
        );
        self.objects.push(GeometryObject {
            id,
            polydata,
            bounds,
            style,
            actor,
        });
        Ok(id)
    }

    pub fn get(&self, id: GeometryId) -> Result<&GeometryObject> {
        self.objects.get(id.0).ok_or(ViewerError::NotFound {
            id: id.0,
            count: self.objects.len(),
        })
    }

    /// Bounds of the first object added
    pub fn bounds(&self) -> Result<Bounds> {
        self.objects
            .first()
            .map(|o| o.bounds)
            .ok_or(ViewerError::EmptyRegistry)
    }

    pub fn first(&self) -> Result<&GeometryObject> {
        self.objects.first().ok_or(ViewerError::EmptyRegistry)
    }

    /// Bind a new display style: the old actor is replaced, the payload is shared.
    pub fn restyle<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: GeometryId,
        style: DisplayStyle,
    ) -> Result<ActorHandle> {
        let count = self.objects.len();
        let object = self
            .objects
            .get_mut(id.0)
            .ok_or(ViewerError::NotFound { id: id.0, count })?;

        let visible = surface.actor_visible(object.actor).unwrap_or(true);
        let actor = surface.add_actor(Actor::Geometry {
            polydata: Arc::clone(&object.polydata),
            style,
        });
        surface.remove_actor(object.actor);
        object.actor = actor;
        object.style = style;
        if !visible {
            surface.set_actor_visible(actor, false);
        }
        Ok(actor)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryObject> {
        self.objects.iter()
    }
}
