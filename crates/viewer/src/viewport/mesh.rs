//! CPU-side tessellation of actors into GPU-ready vertex arrays.

use glam::DVec3;
use mmviewer_lib::adapter::{Actor, DisplayStyle, PlaneActor};
use mmviewer_lib::geometry::{self, TriMesh};
use shared::{Color, PolyData, Representation};

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Clone, Default)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 9
    }

    fn push_vertex(&mut self, p: DVec3, n: DVec3, color: Color) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&[
            p.x as f32, p.y as f32, p.z as f32, n.x as f32, n.y as f32, n.z as f32,
            color[0] as f32, color[1] as f32, color[2] as f32,
        ]);
        index
    }

    fn append_tri_mesh(&mut self, mesh: &TriMesh, color: Color) {
        let base = self.vertex_count() as u32;
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            self.push_vertex(*p, *n, color);
        }
        self.indices
            .extend(mesh.triangles.iter().flat_map(|t| t.map(|i| i + base)));
    }
}

/// Lines or points mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
#[derive(Clone, Default)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    fn push(&mut self, p: DVec3, color: Color) {
        self.vertices.extend_from_slice(&[
            p.x as f32, p.y as f32, p.z as f32, color[0] as f32, color[1] as f32,
            color[2] as f32, 1.0,
        ]);
    }

    fn segment(&mut self, a: DVec3, b: DVec3, color: Color) {
        self.push(a, color);
        self.push(b, color);
    }

    fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Everything needed to draw one world-space actor
#[derive(Clone, Default)]
pub struct ActorBatch {
    pub triangles: Option<MeshData>,
    pub lines: Option<LineMeshData>,
    pub points: Option<LineMeshData>,
    pub line_width: f32,
    pub point_size: f32,
}

/// Tessellate a world-space actor. Screen-space actors (text, axes
/// annotation, orientation marker) are drawn by egui and yield `None`.
pub fn tessellate(actor: &Actor) -> Option<ActorBatch> {
    match actor {
        Actor::Geometry { polydata, style } => Some(polydata_batch(polydata, style)),
        Actor::Glyphs(glyphs) => {
            let mut mesh = MeshData::default();
            mesh.append_tri_mesh(&glyphs.tessellate(), glyphs.color);
            Some(ActorBatch {
                triangles: Some(mesh),
                line_width: 1.0,
                point_size: 1.0,
                ..Default::default()
            })
        }
        Actor::Plane(plane) => Some(plane_batch(plane)),
        Actor::CubeAxes(_) | Actor::Text(_) | Actor::OrientationMarker => None,
    }
}

fn polydata_batch(pd: &PolyData, style: &DisplayStyle) -> ActorBatch {
    let point = |i: usize| DVec3::from_array(pd.points[i]);
    let mut triangles = MeshData::default();
    let mut lines = LineMeshData::default();
    let mut points = LineMeshData::default();

    for poly in &pd.polys {
        let edge_color = match style.representation {
            Representation::Surface => style.edge_color,
            Representation::Wireframe => style.color,
        };
        for (k, &i) in poly.iter().enumerate() {
            lines.segment(point(i), point(poly[(k + 1) % poly.len()]), edge_color);
        }
        if style.representation == Representation::Wireframe {
            continue;
        }
        // Flat shading, fan triangulation from the first corner
        let normal = geometry::face_normal(pd, poly).unwrap_or(DVec3::Z);
        let corners: Vec<u32> = poly
            .iter()
            .map(|&i| triangles.push_vertex(point(i), normal, style.color))
            .collect();
        for k in 1..corners.len() - 1 {
            triangles
                .indices
                .extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
        }
    }

    for line in &pd.lines {
        for pair in line.windows(2) {
            lines.segment(point(pair[0]), point(pair[1]), style.color);
        }
    }

    for &v in &pd.verts {
        points.push(point(v), style.color);
    }

    ActorBatch {
        triangles: (!triangles.indices.is_empty()).then_some(triangles),
        lines: (!lines.is_empty()).then_some(lines),
        points: (!points.is_empty()).then_some(points),
        line_width: style.line_width,
        point_size: style.point_size,
    }
}

fn plane_batch(plane: &PlaneActor) -> ActorBatch {
    let corners = plane.corners();
    let normal = (plane.point1 - plane.origin)
        .cross(plane.point2 - plane.origin)
        .try_normalize()
        .unwrap_or(DVec3::Z);

    let mut triangles = MeshData::default();
    let idx: Vec<u32> = corners
        .iter()
        .map(|c| triangles.push_vertex(*c, normal, plane.color))
        .collect();
    triangles
        .indices
        .extend_from_slice(&[idx[0], idx[1], idx[2], idx[0], idx[2], idx[3]]);

    let mut lines = LineMeshData::default();
    for k in 0..4 {
        lines.segment(corners[k], corners[(k + 1) % 4], plane.edge_color);
    }

    ActorBatch {
        triangles: Some(triangles),
        lines: Some(lines),
        points: None,
        line_width: plane.line_width,
        point_size: 1.0,
    }
}
