use serde::{Deserialize, Serialize};

/// A point in world space
pub type Point3 = [f64; 3];

/// RGB color with components in `0.0..=1.0`
pub type Color = [f64; 3];

pub const BLACK: Color = [0.0, 0.0, 0.0];
pub const YELLOW: Color = [1.0, 1.0, 0.0];

/// How a geometry object is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    #[default]
    Surface,
    Wireframe,
}

/// Polygonal payload: points plus vertex, line and polygon cells.
///
/// Cells reference points by index. Lines are kept as index lists so that
/// malformed input (a line with one or three endpoints) survives parsing and
/// can be rejected with a proper diagnostic at registration time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolyData {
    pub points: Vec<Point3>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verts: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polys: Vec<Vec<usize>>,
}

impl PolyData {
    /// Single vertex cell at `position`
    pub fn point(position: Point3) -> Self {
        Self {
            points: vec![position],
            verts: vec![0],
            ..Default::default()
        }
    }

    /// Single line cell from `p0` to `p1`
    pub fn line(p0: Point3, p1: Point3) -> Self {
        Self {
            points: vec![p0, p1],
            lines: vec![vec![0, 1]],
            ..Default::default()
        }
    }

    /// Surface mesh from points and polygon faces
    pub fn mesh(points: Vec<Point3>, polys: Vec<Vec<usize>>) -> Self {
        Self {
            points,
            polys,
            ..Default::default()
        }
    }

    pub fn cell_count(&self) -> usize {
        self.verts.len() + self.lines.len() + self.polys.len()
    }

    /// Axis-aligned bounds of all points, `None` when there are no points
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let mut b = Bounds {
            xmin: first[0],
            xmax: first[0],
            ymin: first[1],
            ymax: first[1],
            zmin: first[2],
            zmax: first[2],
        };
        for p in &self.points[1..] {
            b.xmin = b.xmin.min(p[0]);
            b.xmax = b.xmax.max(p[0]);
            b.ymin = b.ymin.min(p[1]);
            b.ymax = b.ymax.max(p[1]);
            b.zmin = b.zmin.min(p[2]);
            b.zmax = b.zmax.max(p[2]);
        }
        Some(b)
    }
}

/// Axis-aligned bounding box in VTK order (xmin, xmax, ymin, ymax, zmin, zmax)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl Bounds {
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64) {
        (self.xmin, self.xmax, self.ymin, self.ymax, self.zmin, self.zmax)
    }

    pub fn center(&self) -> Point3 {
        [
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
            0.5 * (self.zmin + self.zmax),
        ]
    }

    /// Length of the box diagonal
    pub fn diagonal(&self) -> f64 {
        let dx = self.xmax - self.xmin;
        let dy = self.ymax - self.ymin;
        let dz = self.zmax - self.zmin;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
            zmin: self.zmin.min(other.zmin),
            zmax: self.zmax.max(other.zmax),
        }
    }
}

fn default_color() -> Color {
    YELLOW
}

/// One entry of a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub geometry: PolyData,
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default)]
    pub representation: Representation,
}

/// Geometry set loaded by the viewer binary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub objects: Vec<SceneObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_empty_polydata() {
        assert!(PolyData::default().bounds().is_none());
    }

    #[test]
    fn test_bounds_of_mesh() {
        let pd = PolyData::mesh(
            vec![[0.0, -1.0, 2.0], [10.0, 3.0, -2.0], [4.0, 10.0, 0.5]],
            vec![vec![0, 1, 2]],
        );
        let b = pd.bounds().unwrap();
        assert_eq!(b.as_tuple(), (0.0, 10.0, -1.0, 10.0, -2.0, 2.0));
        assert_eq!(b.center(), [5.0, 4.5, 0.0]);
    }

    #[test]
    fn test_line_and_point_constructors() {
        let line = PolyData::line([0.0; 3], [1.0, 0.0, 0.0]);
        assert_eq!(line.lines, vec![vec![0, 1]]);
        assert_eq!(line.cell_count(), 1);

        let point = PolyData::point([1.0, 2.0, 3.0]);
        assert_eq!(point.verts, vec![0]);
        assert_eq!(point.bounds().unwrap().diagonal(), 0.0);
    }

    #[test]
    fn test_scene_file_defaults() {
        let json = r#"{"objects": [{"geometry": {"points": [[0,0,0],[1,0,0],[0,1,0]], "polys": [[0,1,2]]}}]}"#;
        let scene: SceneFile = serde_json::from_str(json).unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].color, YELLOW);
        assert_eq!(scene.objects[0].representation, Representation::Surface);
        assert!(scene.objects[0].geometry.lines.is_empty());
    }

    #[test]
    fn test_representation_serde() {
        let r: Representation = serde_json::from_str("\"wireframe\"").unwrap();
        assert_eq!(r, Representation::Wireframe);
    }

    #[test]
    fn test_bounds_union() {
        let a = PolyData::point([0.0, 0.0, 0.0]).bounds().unwrap();
        let b = PolyData::point([2.0, -1.0, 3.0]).bounds().unwrap();
        assert_eq!(a.union(&b).as_tuple(), (0.0, 2.0, -1.0, 0.0, 0.0, 3.0));
    }
}
