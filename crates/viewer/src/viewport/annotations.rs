//! Screen-space actors drawn with the egui painter on top of the GL frame:
//! corner text, the bounding-box axes annotation and the orientation triad.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke};
use glam::Vec3;
use mmviewer_lib::adapter::{Corner, CubeAxes, FlyMode, TextAnnotation};
use shared::Color;

use super::camera::ArcBallCamera;

const TEXT_MARGIN: f32 = 8.0;
const AXES_BASE_FONT: f32 = 14.0;
const AXES_TICKS: usize = 5;
const TRIAD_LENGTH: f32 = 40.0;

pub fn color32(c: Color) -> Color32 {
    let [r, g, b] = c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// Corner text, shrunk when it would not fit a third of the viewport width
pub fn draw_text(painter: &Painter, rect: Rect, text: &TextAnnotation) {
    let longest = text.text.lines().map(|l| l.chars().count()).max().unwrap_or(1).max(1);
    let fit = rect.width() / 3.0 / (0.6 * longest as f32);
    let size = text.max_font_size.min(fit).max(6.0);

    let (pos, anchor) = match text.corner {
        Corner::LowerLeft => (rect.left_bottom() + egui::vec2(TEXT_MARGIN, -TEXT_MARGIN), Align2::LEFT_BOTTOM),
        Corner::LowerRight => (rect.right_bottom() + egui::vec2(-TEXT_MARGIN, -TEXT_MARGIN), Align2::RIGHT_BOTTOM),
        Corner::UpperLeft => (rect.left_top() + egui::vec2(TEXT_MARGIN, TEXT_MARGIN), Align2::LEFT_TOP),
        Corner::UpperRight => (rect.right_top() + egui::vec2(-TEXT_MARGIN, TEXT_MARGIN), Align2::RIGHT_TOP),
    };
    painter.text(pos, anchor, &text.text, FontId::proportional(size), color32(text.color));
}

/// Box edges and labelled ticks along x, y and z, following the camera
pub fn draw_cube_axes(painter: &Painter, rect: Rect, camera: &ArcBallCamera, axes: &CubeAxes) {
    let b = &axes.bounds;
    let min = Vec3::new(b.xmin as f32, b.ymin as f32, b.zmin as f32);
    let max = Vec3::new(b.xmax as f32, b.ymax as f32, b.zmax as f32);
    let center = (min + max) * 0.5;
    let Some(screen_center) = camera.project(center, rect) else {
        return;
    };

    let eye = camera.eye_position();
    let font = FontId::monospace(AXES_BASE_FONT * axes.font_factor);
    let color = color32(axes.label_color);
    let stroke = Stroke::new(1.0, color);

    let lows = [b.xmin, b.ymin, b.zmin];
    let highs = [b.xmax, b.ymax, b.zmax];

    for (axis, title) in ["X", "Y", "Z"].into_iter().enumerate() {
        let (lo, hi) = (lows[axis], highs[axis]);
        // Of the four box edges parallel to this axis, outer edges keep the
        // one farthest from the projected box center, the triad the one
        // nearest to the eye.
        let edge = box_edges(min, max, axis)
            .into_iter()
            .filter_map(|(a, c)| {
                let pa = camera.project(a, rect)?;
                let pc = camera.project(c, rect)?;
                let score = match axes.fly_mode {
                    FlyMode::OuterEdges => (pa + (pc - pa) * 0.5 - screen_center).length(),
                    FlyMode::ClosestTriad => -eye.distance((a + c) * 0.5),
                };
                Some((pa, pc, score))
            })
            .max_by(|x, y| x.2.total_cmp(&y.2));
        let Some((pa, pc, _)) = edge else {
            continue;
        };
        painter.line_segment([pa, pc], stroke);

        let outward = {
            let mid = pa + (pc - pa) * 0.5;
            (mid - screen_center).normalized() * 14.0
        };
        for k in 0..AXES_TICKS {
            let t = k as f32 / (AXES_TICKS - 1) as f32;
            let value = lo + (hi - lo) * t as f64;
            let at = pa + (pc - pa) * t;
            painter.line_segment([at, at + outward * 0.3], stroke);
            label(painter, at + outward, &axes.label(value), &font, color, axes.label_shadow);
        }
        let mid = pa + (pc - pa) * 0.5;
        label(painter, mid + outward * 2.2, title, &font, color, axes.label_shadow);
    }
}

fn label(painter: &Painter, pos: Pos2, text: &str, font: &FontId, color: Color32, shadow: bool) {
    if shadow {
        painter.text(
            pos + egui::vec2(1.0, 1.0),
            Align2::CENTER_CENTER,
            text,
            font.clone(),
            Color32::from_gray(128),
        );
    }
    painter.text(pos, Align2::CENTER_CENTER, text, font.clone(), color);
}

/// The four edges of the box running along `axis`
fn box_edges(min: Vec3, max: Vec3, axis: usize) -> [(Vec3, Vec3); 4] {
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    let corner = |su: bool, sv: bool, end: bool| {
        let mut p = min;
        p[axis] = if end { max[axis] } else { min[axis] };
        p[u] = if su { max[u] } else { min[u] };
        p[v] = if sv { max[v] } else { min[v] };
        p
    };
    [(false, false), (true, false), (false, true), (true, true)]
        .map(|(su, sv)| (corner(su, sv, false), corner(su, sv, true)))
}

/// Axes triad in the lower-left corner, rotating with the camera
pub fn draw_orientation_marker(painter: &Painter, rect: Rect, camera: &ArcBallCamera) {
    let origin = rect.left_bottom() + egui::vec2(TRIAD_LENGTH + 16.0, -(TRIAD_LENGTH + 16.0));
    let axes = [
        (Vec3::X, "X", Color32::from_rgb(220, 60, 60)),
        (Vec3::Y, "Y", Color32::from_rgb(60, 180, 60)),
        (Vec3::Z, "Z", Color32::from_rgb(60, 90, 220)),
    ];
    for (dir, name, color) in axes {
        let tip = origin + camera.screen_axis(dir) * TRIAD_LENGTH;
        painter.line_segment([origin, tip], Stroke::new(2.5, color));
        painter.text(
            tip + (tip - origin).normalized() * 8.0,
            Align2::CENTER_CENTER,
            name,
            FontId::monospace(12.0),
            color,
        );
    }
}
