//! Translate egui input into viewer key events

use eframe::egui;
use mmviewer_lib::controller::KeyEvent;

/// Key presses of this frame, in arrival order.
///
/// Printable keys come from text events so that they carry the character
/// actually typed (case and layout included). Non-printable keys are
/// reported by name.
pub fn collect_key_events(ctx: &egui::Context) -> Vec<KeyEvent> {
    // Don't steal keys from a focused widget
    if ctx.memory(|m| m.focused().is_some()) {
        return Vec::new();
    }

    ctx.input(|i| {
        i.events
            .iter()
            .flat_map(|event| match event {
                egui::Event::Text(text) => text.chars().map(KeyEvent::Char).collect(),
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } if is_named(*key) => vec![KeyEvent::Named(key.name().to_string())],
                _ => Vec::new(),
            })
            .collect()
    })
}

fn is_named(key: egui::Key) -> bool {
    matches!(
        key,
        egui::Key::Escape
            | egui::Key::Enter
            | egui::Key::Tab
            | egui::Key::Backspace
            | egui::Key::Delete
            | egui::Key::ArrowUp
            | egui::Key::ArrowDown
            | egui::Key::ArrowLeft
            | egui::Key::ArrowRight
    )
}
