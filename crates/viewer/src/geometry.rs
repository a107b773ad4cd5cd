//! Geometry checks and derived shapes: face normals, centroids and arrow glyphs.

use glam::{DQuat, DVec3};
use shared::{Bounds, Color, PolyData};

use crate::adapter::bounds_of;
use crate::config::ArrowShape;
use crate::error::{Result, ViewerError};

/// Reject payloads that cannot be rendered: no points, non-finite
/// coordinates, wrong cell arity or dangling point indices.
pub fn validate(pd: &PolyData) -> Result<()> {
    let n = pd.points.len();
    if n == 0 {
        return Err(ViewerError::InvalidGeometry("geometry has no points".into()));
    }
    if let Some(i) = pd.points.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
        return Err(ViewerError::InvalidGeometry(format!(
            "point {i} has a non-finite coordinate"
        )));
    }
    if let Some(&idx) = pd.verts.iter().find(|&&idx| idx >= n) {
        return Err(ViewerError::InvalidGeometry(format!(
            "vertex cell references point {idx} but only {n} points exist"
        )));
    }
    for (i, line) in pd.lines.iter().enumerate() {
        if line.len() != 2 {
            return Err(ViewerError::InvalidGeometry(format!(
                "line cell {i} has {} endpoint indices, expected 2",
                line.len()
            )));
        }
        check_indices("line", i, line, n)?;
    }
    for (i, poly) in pd.polys.iter().enumerate() {
        if poly.len() < 3 {
            return Err(ViewerError::InvalidGeometry(format!(
                "polygon cell {i} has {} point indices, expected at least 3",
                poly.len()
            )));
        }
        check_indices("polygon", i, poly, n)?;
    }
    Ok(())
}

fn check_indices(what: &str, cell: usize, ids: &[usize], n: usize) -> Result<()> {
    match ids.iter().find(|&&idx| idx >= n) {
        Some(idx) => Err(ViewerError::InvalidGeometry(format!(
            "{what} cell {cell} references point {idx} but only {n} points exist"
        ))),
        None => Ok(()),
    }
}

fn point(pd: &PolyData, idx: usize) -> DVec3 {
    DVec3::from_array(pd.points[idx])
}

/// Average of the polygon's points
pub fn face_centroid(pd: &PolyData, poly: &[usize]) -> DVec3 {
    let sum: DVec3 = poly.iter().map(|&i| point(pd, i)).sum();
    sum / poly.len() as f64
}

/// Unit normal of a polygon (Newell's method).
///
/// The winding is trusted as given: no attempt is made to orient faces
/// consistently across the mesh. Degenerate polygons yield `None`.
pub fn face_normal(pd: &PolyData, poly: &[usize]) -> Option<DVec3> {
    let mut n = DVec3::ZERO;
    for (k, &i) in poly.iter().enumerate() {
        let a = point(pd, i);
        let b = point(pd, poly[(k + 1) % poly.len()]);
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.try_normalize()
}

/// One arrow: anchored at `anchor`, pointing along unit `direction`
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub anchor: DVec3,
    pub direction: DVec3,
    pub length: f64,
}

/// A set of arrow glyphs rendered as a single actor
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphSet {
    pub glyphs: Vec<Glyph>,
    pub shape: ArrowShape,
    pub color: Color,
}

impl GlyphSet {
    /// One fixed-length arrow per polygon, anchored at its centroid
    pub fn face_normals(pd: &PolyData, scale: f64, shape: ArrowShape, color: Color) -> Self {
        let glyphs = pd
            .polys
            .iter()
            .filter_map(|poly| {
                let direction = face_normal(pd, poly)?;
                Some(Glyph {
                    anchor: face_centroid(pd, poly),
                    direction,
                    length: scale,
                })
            })
            .collect();
        Self {
            glyphs,
            shape,
            color,
        }
    }

    /// Single arrow along `value / scale`, its length following the vector magnitude
    pub fn vector(anchor: DVec3, value: DVec3, scale: f64, shape: ArrowShape, color: Color) -> Self {
        let scaled = value / scale;
        let glyphs = scaled
            .try_normalize()
            .map(|direction| Glyph {
                anchor,
                direction,
                length: scaled.length(),
            })
            .into_iter()
            .collect();
        Self {
            glyphs,
            shape,
            color,
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        bounds_of(
            self.glyphs
                .iter()
                .flat_map(|g| [g.anchor, g.anchor + g.direction * g.length]),
        )
    }

    /// Triangulate every arrow into one mesh
    pub fn tessellate(&self) -> TriMesh {
        let arrow = arrow_mesh(&self.shape);
        let mut out = TriMesh::default();
        for glyph in &self.glyphs {
            let rotation = DQuat::from_rotation_arc(DVec3::X, glyph.direction);
            let base = out.positions.len() as u32;
            out.positions.extend(
                arrow
                    .positions
                    .iter()
                    .map(|p| glyph.anchor + rotation * (*p * glyph.length)),
            );
            out.normals
                .extend(arrow.normals.iter().map(|n| rotation * *n));
            out.triangles.extend(
                arrow
                    .triangles
                    .iter()
                    .map(|t| [t[0] + base, t[1] + base, t[2] + base]),
            );
        }
        out
    }
}

/// Indexed triangle mesh with per-vertex normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    fn push(&mut self, p: DVec3, n: DVec3) -> u32 {
        self.positions.push(p);
        self.normals.push(n);
        (self.positions.len() - 1) as u32
    }
}

/// Unit-length arrow along +X: a capped cylindrical shaft and a capped cone tip
pub fn arrow_mesh(shape: &ArrowShape) -> TriMesh {
    let mut mesh = TriMesh::default();
    let tip_start = 1.0 - shape.tip_length;

    let ring = |radius: f64, x: f64, k: u32, res: u32| {
        let a = std::f64::consts::TAU * k as f64 / res as f64;
        (
            DVec3::new(x, radius * a.cos(), radius * a.sin()),
            DVec3::new(0.0, a.cos(), a.sin()),
        )
    };

    // Shaft side
    let res = shape.shaft_resolution.max(3);
    for k in 0..res {
        let (p0, n0) = ring(shape.shaft_radius, 0.0, k, res);
        let (p1, n1) = ring(shape.shaft_radius, 0.0, k + 1, res);
        let q0 = p0 + DVec3::X * tip_start;
        let q1 = p1 + DVec3::X * tip_start;
        let a = mesh.push(p0, n0);
        let b = mesh.push(p1, n1);
        let c = mesh.push(q1, n1);
        let d = mesh.push(q0, n0);
        mesh.triangles.push([a, b, c]);
        mesh.triangles.push([a, c, d]);
    }
    // Shaft base cap
    let center = mesh.push(DVec3::ZERO, DVec3::NEG_X);
    for k in 0..res {
        let (p0, _) = ring(shape.shaft_radius, 0.0, k, res);
        let (p1, _) = ring(shape.shaft_radius, 0.0, k + 1, res);
        let a = mesh.push(p0, DVec3::NEG_X);
        let b = mesh.push(p1, DVec3::NEG_X);
        mesh.triangles.push([center, b, a]);
    }

    // Cone side
    let res = shape.tip_resolution.max(3);
    let slope = shape.tip_radius / shape.tip_length.max(f64::EPSILON);
    let apex = DVec3::X;
    for k in 0..res {
        let (p0, r0) = ring(shape.tip_radius, tip_start, k, res);
        let (p1, r1) = ring(shape.tip_radius, tip_start, k + 1, res);
        let n0 = (r0 + DVec3::X * slope).normalize();
        let n1 = (r1 + DVec3::X * slope).normalize();
        let a = mesh.push(p0, n0);
        let b = mesh.push(p1, n1);
        let c = mesh.push(apex, (n0 + n1).normalize());
        mesh.triangles.push([a, b, c]);
    }
    // Cone base cap
    let center = mesh.push(DVec3::X * tip_start, DVec3::NEG_X);
    for k in 0..res {
        let (p0, _) = ring(shape.tip_radius, tip_start, k, res);
        let (p1, _) = ring(shape.tip_radius, tip_start, k + 1, res);
        let a = mesh.push(p0, DVec3::NEG_X);
        let b = mesh.push(p1, DVec3::NEG_X);
        mesh.triangles.push([center, b, a]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(
            validate(&PolyData::default()),
            Err(ViewerError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_line() {
        let pd = fixtures::malformed_line();
        let err = validate(&pd).unwrap_err();
        assert!(err.to_string().contains("expected 2"), "{err}");
    }

    #[test]
    fn test_validate_rejects_dangling_index() {
        let pd = PolyData::mesh(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![vec![0, 1, 3]]);
        assert!(validate(&pd).is_err());

        let pd = PolyData {
            points: vec![[0.0; 3]],
            verts: vec![1],
            ..Default::default()
        };
        assert!(validate(&pd).is_err());
    }

    #[test]
    fn test_validate_rejects_two_point_polygon() {
        let pd = PolyData::mesh(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![vec![0, 1]]);
        assert!(validate(&pd).is_err());
    }

    #[test]
    fn test_validate_accepts_fixtures() {
        for pd in [
            fixtures::triangle(),
            fixtures::square(10.0),
            fixtures::cube(2.0),
            PolyData::line([0.0; 3], [1.0; 3]),
            PolyData::point([0.0; 3]),
        ] {
            assert!(validate(&pd).is_ok());
        }
    }

    #[test]
    fn test_face_normal_follows_winding() {
        let pd = fixtures::triangle();
        let n = face_normal(&pd, &pd.polys[0]).unwrap();
        assert!((n - DVec3::Z).length() < 1e-12);

        let flipped = vec![0, 2, 1];
        let n = face_normal(&pd, &flipped).unwrap();
        assert!((n + DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_degenerate_face_has_no_normal() {
        let pd = PolyData::mesh(vec![[0.0; 3], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]], vec![vec![0, 1, 2]]);
        assert!(face_normal(&pd, &pd.polys[0]).is_none());
        let glyphs = GlyphSet::face_normals(&pd, 1.0, ArrowShape::NORMAL, [1.0; 3]);
        assert!(glyphs.is_empty());
    }

    #[test]
    fn test_face_normals_anchor_at_centroids() {
        let pd = fixtures::triangle();
        let glyphs = GlyphSet::face_normals(&pd, 1.0, ArrowShape::NORMAL, [1.0; 3]);
        assert_eq!(glyphs.len(), 1);
        let anchor = glyphs.glyphs[0].anchor;
        assert!((anchor - DVec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-12);
        assert_eq!(glyphs.glyphs[0].length, 1.0);
    }

    #[test]
    fn test_cube_has_outward_normals() {
        let pd = fixtures::cube(2.0);
        let glyphs = GlyphSet::face_normals(&pd, 1.0, ArrowShape::NORMAL, [1.0; 3]);
        assert_eq!(glyphs.len(), 6);
        for g in &glyphs.glyphs {
            // centroid and normal point the same way for a cube centered at the origin
            assert!(g.anchor.dot(g.direction) > 0.0);
        }
    }

    #[test]
    fn test_tessellated_arrow_spans_glyph_length() {
        let glyphs = GlyphSet::vector(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(0.0, 0.0, 4.0),
            2.0,
            ArrowShape::VECTOR,
            [0.0; 3],
        );
        assert_eq!(glyphs.len(), 1);
        let mesh = glyphs.tessellate();
        assert_eq!(mesh.positions.len(), mesh.normals.len());
        let max_z = mesh.positions.iter().map(|p| p.z).fold(f64::MIN, f64::max);
        let min_z = mesh.positions.iter().map(|p| p.z).fold(f64::MAX, f64::min);
        assert!((max_z - 5.0).abs() < 1e-9);
        assert!((min_z - 3.0).abs() < 1e-9);
        let n = mesh.positions.len() as u32;
        assert!(mesh.triangles.iter().flatten().all(|&i| i < n));
    }

    #[test]
    fn test_zero_vector_yields_no_glyph() {
        let glyphs = GlyphSet::vector(DVec3::ZERO, DVec3::ZERO, 1.0, ArrowShape::VECTOR, [0.0; 3]);
        assert!(glyphs.is_empty());
        assert!(glyphs.bounds().is_none());
    }
}
