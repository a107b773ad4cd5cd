//! Integration tests for overlay toggling through the public session API.

use glam::DVec3;
use mmviewer_lib::adapter::{Actor, ActorKind, DisplayStyle};
use mmviewer_lib::config::OverlaySettings;
use mmviewer_lib::fixtures;
use mmviewer_lib::harness::headless_session;
use mmviewer_lib::overlay::{OverlayKind, OverlayManager, OverlayState};
use mmviewer_lib::ViewerError;

#[test]
fn test_normal_glyph_on_triangle_centroid() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::triangle(), DisplayStyle::default())
        .unwrap();
    let mut overlays = OverlayManager::new(OverlaySettings::default());

    assert!(overlays.toggle_normals(&mut session).unwrap());
    let glyphs = session.surface().actors(ActorKind::Glyphs);
    assert_eq!(glyphs.len(), 1);
    let Actor::Glyphs(set) = glyphs[0] else {
        panic!("expected glyphs, got {:?}", glyphs[0]);
    };
    assert_eq!(set.len(), 1);
    let glyph = &set.glyphs[0];
    assert!((glyph.anchor - DVec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-12);
    assert!((glyph.direction - DVec3::Z).length() < 1e-12);
    assert_eq!(glyph.length, 1.0);

    assert!(!overlays.toggle_normals(&mut session).unwrap());
    assert_eq!(session.surface().count(ActorKind::Glyphs), 0);
}

#[test]
fn test_reference_plane_on_empty_registry() {
    let mut session = headless_session().unwrap();
    let renders = session.surface().render_count();
    let mut overlays = OverlayManager::default();

    let err = overlays.toggle_reference_plane(&mut session).unwrap_err();
    assert!(matches!(err, ViewerError::EmptyRegistry));
    assert_eq!(session.surface().count(ActorKind::Plane), 0);
    assert_eq!(*overlays.state(OverlayKind::ReferencePlane), OverlayState::Hidden);
    assert_eq!(session.surface().render_count(), renders);
}

#[test]
fn test_reference_plane_corners() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::square(10.0), DisplayStyle::default())
        .unwrap();
    let mut overlays = OverlayManager::default();
    overlays.toggle_reference_plane(&mut session).unwrap();

    let planes = session.surface().actors(ActorKind::Plane);
    assert_eq!(planes.len(), 1);
    let Actor::Plane(plane) = planes[0] else {
        panic!("expected plane, got {:?}", planes[0]);
    };
    assert_eq!(plane.origin, DVec3::new(-1.0, 11.0, 0.0));
    assert_eq!(plane.point1, DVec3::new(-1.0, -1.0, 0.0));
    assert_eq!(plane.point2, DVec3::new(11.0, 11.0, 0.0));
}

#[test]
fn test_plane_follows_first_object_only() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::square(10.0), DisplayStyle::default())
        .unwrap();
    session
        .add_polydata(fixtures::floating_box(100.0, 100.0, 1.0), DisplayStyle::default())
        .unwrap();
    let mut overlays = OverlayManager::default();
    overlays.toggle_reference_plane(&mut session).unwrap();

    let Actor::Plane(plane) = session.surface().actors(ActorKind::Plane)[0] else {
        panic!("expected plane");
    };
    assert_eq!(plane.point2, DVec3::new(11.0, 11.0, 0.0));
}

#[test]
fn test_normals_one_actor_per_object() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(2.0), DisplayStyle::default())
        .unwrap();
    // A bare line has no faces but still gets its (empty) glyph actor
    session
        .add_line([0.0; 3], [1.0, 0.0, 0.0], [0.0; 3])
        .unwrap();
    let mut overlays = OverlayManager::default();
    overlays.toggle_normals(&mut session).unwrap();

    let glyphs = session.surface().actors(ActorKind::Glyphs);
    assert_eq!(glyphs.len(), 2);
    let counts: Vec<usize> = glyphs
        .iter()
        .map(|a| match a {
            Actor::Glyphs(set) => set.len(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(counts, vec![6, 0]);
}

#[test]
fn test_toggle_twice_restores_actor_set() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let before: Vec<_> = session.surface().store().iter().map(|(h, _)| h).collect();
    let mut overlays = OverlayManager::default();

    for kind in [
        OverlayKind::Normals,
        OverlayKind::BoundingAxes,
        OverlayKind::ReferencePlane,
    ] {
        overlays.toggle(&mut session, kind).unwrap();
        overlays.toggle(&mut session, kind).unwrap();
        let after: Vec<_> = session.surface().store().iter().map(|(h, _)| h).collect();
        assert_eq!(after, before, "{kind} left actors behind");
    }
}

#[test]
fn test_even_toggle_runs_from_shown_state() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    session
        .add_polydata(fixtures::square(2.0), DisplayStyle::default())
        .unwrap();
    let mut overlays = OverlayManager::default();

    for kind in [
        OverlayKind::Normals,
        OverlayKind::BoundingAxes,
        OverlayKind::ReferencePlane,
    ] {
        assert!(overlays.toggle(&mut session, kind).unwrap());
        let shown_len = overlays.state(kind).actors().len();
        let store_len = session.surface().store().len();

        for run in [4, 6] {
            for _ in 0..run {
                overlays.toggle(&mut session, kind).unwrap();
            }
            assert!(overlays.is_shown(kind), "{kind} hidden after {run} toggles");
            assert_eq!(overlays.state(kind).actors().len(), shown_len);
            assert_eq!(session.surface().store().len(), store_len);
            for handle in overlays.state(kind).actors() {
                assert!(session.surface().store().contains(*handle));
            }
        }
    }
}
