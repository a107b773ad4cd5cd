//! Keyboard command dispatch.
//!
//! Three independent overlay toggles and three one-shot actions share a
//! single event stream. Events are handled strictly one at a time, in
//! arrival order; each handler runs to completion before the next event is
//! looked at, so overlay actor lists are never observed half-updated.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::adapter::RenderSurface;
use crate::config::OverlaySettings;
use crate::error::ViewerError;
use crate::overlay::{OverlayKind, OverlayManager};
use crate::registry::GeometryId;
use crate::session::ViewerSession;

/// A discrete key press as delivered by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable key, case-sensitive
    Char(char),
    /// Non-printable key such as `Escape` or `ArrowUp`
    Named(String),
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Char(c) => write!(f, "'{c}'"),
            KeyEvent::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleNormals,
    ToggleAxes,
    ToggleReferencePlane,
    SaveGeometry,
    Screenshot,
    Quit,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::ToggleNormals,
        Command::ToggleAxes,
        Command::ToggleReferencePlane,
        Command::SaveGeometry,
        Command::Screenshot,
        Command::Quit,
    ];

    pub fn from_key(event: &KeyEvent) -> Option<Command> {
        match event {
            KeyEvent::Char('n') => Some(Command::ToggleNormals),
            KeyEvent::Char('b') => Some(Command::ToggleAxes),
            KeyEvent::Char('h') => Some(Command::ToggleReferencePlane),
            KeyEvent::Char('x') => Some(Command::SaveGeometry),
            KeyEvent::Char('c') => Some(Command::Screenshot),
            KeyEvent::Char('e') | KeyEvent::Char('q') => Some(Command::Quit),
            _ => None,
        }
    }

    /// Key(s) bound to this command, as shown in the help legend
    pub fn keys(&self) -> &'static str {
        match self {
            Command::ToggleNormals => "n",
            Command::ToggleAxes => "b",
            Command::ToggleReferencePlane => "h",
            Command::SaveGeometry => "x",
            Command::Screenshot => "c",
            Command::Quit => "e/q",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::ToggleNormals => "(un)show normals",
            Command::ToggleAxes => "(un)show axes box",
            Command::ToggleReferencePlane => "(un)show Oxy plane",
            Command::SaveGeometry => "save",
            Command::Screenshot => "screenshot",
            Command::Quit => "quit",
        }
    }

    fn overlay(&self) -> Option<OverlayKind> {
        match self {
            Command::ToggleNormals => Some(OverlayKind::Normals),
            Command::ToggleAxes => Some(OverlayKind::BoundingAxes),
            Command::ToggleReferencePlane => Some(OverlayKind::ReferencePlane),
            _ => None,
        }
    }
}

/// Outcome of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Unbound key, or the session is already closed
    Ignored,
    Toggled { kind: OverlayKind, shown: bool },
    Saved(PathBuf),
    Captured(PathBuf),
    /// The command failed; a diagnostic was logged and nothing changed
    Rejected(Command),
    Closed,
}

/// Why the event loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Closed,
    /// Every pending event was handled and the session is still open
    Drained,
}

/// Maps key events to overlay toggles and session actions.
///
/// Owns the overlay states and the set of hidden geometry ids.
#[derive(Debug, Default)]
pub struct InteractionController {
    overlays: OverlayManager,
    hidden: BTreeSet<GeometryId>,
}

impl InteractionController {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            overlays: OverlayManager::new(settings),
            hidden: BTreeSet::new(),
        }
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn is_shown(&self, kind: OverlayKind) -> bool {
        self.overlays.is_shown(kind)
    }

    pub fn hidden(&self) -> &BTreeSet<GeometryId> {
        &self.hidden
    }

    /// Handle events in order until the session closes or input runs out.
    /// Events after a quit are dropped unhandled.
    pub fn run_event_loop<S, I>(&mut self, session: &mut ViewerSession<S>, events: I) -> LoopExit
    where
        S: RenderSurface,
        I: IntoIterator<Item = KeyEvent>,
    {
        if session.is_closed() {
            return LoopExit::Closed;
        }
        for event in events {
            if self.handle_event(session, &event) == Action::Closed {
                return LoopExit::Closed;
            }
        }
        LoopExit::Drained
    }

    pub fn handle_event<S: RenderSurface>(
        &mut self,
        session: &mut ViewerSession<S>,
        event: &KeyEvent,
    ) -> Action {
        if session.is_closed() {
            tracing::debug!("Dropping key {event}: session is closed");
            return Action::Ignored;
        }
        match Command::from_key(event) {
            Some(cmd) => self.execute(session, cmd),
            None => {
                tracing::debug!("Ignoring key {event}");
                Action::Ignored
            }
        }
    }

    pub fn execute<S: RenderSurface>(&mut self, session: &mut ViewerSession<S>, cmd: Command) -> Action {
        if let Some(kind) = cmd.overlay() {
            return match self.overlays.toggle(session, kind) {
                Ok(shown) => {
                    tracing::debug!("{} {kind}", if shown { "Showing" } else { "Hiding" });
                    Action::Toggled { kind, shown }
                }
                Err(e) => reject(cmd, e),
            };
        }

        match cmd {
            Command::SaveGeometry => match session.save_geometry() {
                Ok(path) => Action::Saved(path),
                Err(e) => reject(cmd, e),
            },
            Command::Screenshot => match session.screenshot() {
                Ok(path) => Action::Captured(path),
                Err(e) => reject(cmd, e),
            },
            // Overlay states are left as they are; the surface goes with them
            Command::Quit => {
                session.close();
                Action::Closed
            }
            Command::ToggleNormals | Command::ToggleAxes | Command::ToggleReferencePlane => {
                unreachable!("overlay commands are handled above")
            }
        }
    }

    /// Mark a geometry object as hidden and suppress its actor.
    ///
    /// Out-of-range ids are reported and leave the hidden set untouched.
    pub fn hide<S: RenderSurface>(&mut self, session: &mut ViewerSession<S>, id: GeometryId) -> bool {
        self.set_hidden(session, id, true)
    }

    /// Undo [`hide`](Self::hide) for `id`
    pub fn unhide<S: RenderSurface>(&mut self, session: &mut ViewerSession<S>, id: GeometryId) -> bool {
        self.set_hidden(session, id, false)
    }

    fn set_hidden<S: RenderSurface>(
        &mut self,
        session: &mut ViewerSession<S>,
        id: GeometryId,
        hidden: bool,
    ) -> bool {
        let actor = match session.registry().get(id) {
            Ok(object) => object.actor(),
            Err(e) => {
                tracing::warn!("{e}");
                return false;
            }
        };
        if hidden {
            self.hidden.insert(id);
        } else {
            self.hidden.remove(&id);
        }
        let surface = session.surface_mut();
        surface.set_actor_visible(actor, !hidden);
        surface.request_render();
        true
    }
}

fn reject(cmd: Command, err: ViewerError) -> Action {
    tracing::warn!("{}: {err}", cmd.description());
    Action::Rejected(cmd)
}
