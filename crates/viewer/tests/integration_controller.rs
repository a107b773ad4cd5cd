//! Integration tests for keyboard dispatch and the session lifecycle.

use mmviewer_lib::adapter::{ActorKind, DisplayStyle};
use mmviewer_lib::config::{OverlaySettings, ViewerSettings};
use mmviewer_lib::controller::{Action, Command, InteractionController, KeyEvent, LoopExit};
use mmviewer_lib::fixtures;
use mmviewer_lib::harness::{headless_session, headless_session_with, type_keys};
use mmviewer_lib::overlay::OverlayKind;
use mmviewer_lib::GeometryId;

fn controller() -> InteractionController {
    InteractionController::new(OverlaySettings::default())
}

#[test]
fn test_keys_n_n_b_q() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let counter = session.surface().release_counter();
    let mut ctl = controller();

    let exit = type_keys(&mut ctl, &mut session, "nnbq");
    assert_eq!(exit, LoopExit::Closed);
    assert!(!ctl.is_shown(OverlayKind::Normals));
    assert!(ctl.is_shown(OverlayKind::BoundingAxes));
    assert!(!ctl.is_shown(OverlayKind::ReferencePlane));
    assert!(session.is_closed());

    drop(session);
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_events_after_quit_are_dropped() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();

    assert_eq!(type_keys(&mut ctl, &mut session, "qn"), LoopExit::Closed);
    assert!(!ctl.is_shown(OverlayKind::Normals));
    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('b')),
        Action::Ignored
    );
    assert_eq!(type_keys(&mut ctl, &mut session, "h"), LoopExit::Closed);
    assert_eq!(session.surface().release_count(), 1);
}

#[test]
fn test_unbound_and_uppercase_keys_are_noops() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let actors = session.surface().store().len();
    let renders = session.surface().render_count();
    let mut ctl = controller();

    assert_eq!(type_keys(&mut ctl, &mut session, "NBHQzr1 "), LoopExit::Drained);
    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Named("Escape".into())),
        Action::Ignored
    );
    assert_eq!(session.surface().store().len(), actors);
    assert_eq!(session.surface().render_count(), renders);
    assert!(!session.is_closed());
}

#[test]
fn test_unbound_keys_keep_shown_overlays() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();
    assert_eq!(type_keys(&mut ctl, &mut session, "nbh"), LoopExit::Drained);

    let kinds = [
        OverlayKind::Normals,
        OverlayKind::BoundingAxes,
        OverlayKind::ReferencePlane,
    ];
    let states: Vec<_> = kinds
        .iter()
        .map(|kind| ctl.overlays().state(*kind).clone())
        .collect();
    let actors: Vec<_> = session.surface().store().iter().map(|(h, _)| h).collect();

    assert_eq!(type_keys(&mut ctl, &mut session, "NBHQzfsw1 "), LoopExit::Drained);
    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Named("Escape".into())),
        Action::Ignored
    );

    for (kind, before) in kinds.iter().zip(&states) {
        assert!(before.is_shown());
        assert_eq!(ctl.overlays().state(*kind), before);
    }
    let after: Vec<_> = session.surface().store().iter().map(|(h, _)| h).collect();
    assert_eq!(after, actors);
}

#[test]
fn test_toggle_actions() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();

    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('h')),
        Action::Toggled {
            kind: OverlayKind::ReferencePlane,
            shown: true
        }
    );
    assert_eq!(session.surface().count(ActorKind::Plane), 1);
    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('h')),
        Action::Toggled {
            kind: OverlayKind::ReferencePlane,
            shown: false
        }
    );
    assert_eq!(session.surface().count(ActorKind::Plane), 0);
}

#[test]
fn test_toggle_on_empty_registry_is_rejected() {
    let mut session = headless_session().unwrap();
    let mut ctl = controller();

    for (key, cmd) in [
        ('n', Command::ToggleNormals),
        ('b', Command::ToggleAxes),
        ('h', Command::ToggleReferencePlane),
    ] {
        assert_eq!(
            ctl.handle_event(&mut session, &KeyEvent::Char(key)),
            Action::Rejected(cmd)
        );
    }
    assert!(!ctl.is_shown(OverlayKind::Normals));
    assert!(!ctl.is_shown(OverlayKind::BoundingAxes));
    assert!(!ctl.is_shown(OverlayKind::ReferencePlane));
    assert!(!session.is_closed());
}

#[test]
fn test_hide_and_unhide() {
    let mut session = headless_session().unwrap();
    let id = session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let actor = session.registry().get(id).unwrap().actor();
    let mut ctl = controller();

    assert!(ctl.hide(&mut session, id));
    assert!(ctl.hidden().contains(&id));
    assert_eq!(session.surface().store().is_visible(actor), Some(false));

    assert!(ctl.unhide(&mut session, id));
    assert!(ctl.hidden().is_empty());
    assert_eq!(session.surface().store().is_visible(actor), Some(true));
}

#[test]
fn test_hide_out_of_range_is_rejected() {
    let mut session = headless_session().unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();

    assert!(!ctl.hide(&mut session, GeometryId(1)));
    assert!(!ctl.hide(&mut session, GeometryId(usize::MAX)));
    assert!(ctl.hidden().is_empty());
}

#[test]
fn test_save_and_screenshot_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = headless_session_with(ViewerSettings::default().with_output_dir(dir.path())).unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();

    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('x')),
        Action::Saved(dir.path().join("mmviewer_save.vtp"))
    );
    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('c')),
        Action::Captured(dir.path().join("screenshot.png"))
    );
    assert!(dir.path().join("mmviewer_save.vtp").is_file());
    assert!(dir.path().join("screenshot.png").is_file());

    // Exports leave overlay state alone
    assert!(!ctl.is_shown(OverlayKind::Normals));
    assert!(!session.is_closed());
}

#[test]
fn test_save_into_missing_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let mut session = headless_session_with(ViewerSettings::default().with_output_dir(&missing)).unwrap();
    session
        .add_polydata(fixtures::triangle(), DisplayStyle::default())
        .unwrap();
    let mut ctl = controller();

    assert_eq!(
        ctl.handle_event(&mut session, &KeyEvent::Char('x')),
        Action::Rejected(Command::SaveGeometry)
    );
    assert!(!session.is_closed());
}
