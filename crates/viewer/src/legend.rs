//! Static on-screen text: key binding help and copyright line.

use chrono::Datelike;
use shared::BLACK;

use crate::adapter::{Corner, TextAnnotation};
use crate::controller::Command;

/// Camera bindings handled by the render backend itself
const CAMERA_HELP: &[(&str, &str)] = &[
    ("left mouse", "rotate"),
    ("right mouse", "zoom"),
    ("middle mouse", "pan"),
    ("ctrl+left mouse", "spin"),
    ("f", "focus on the mouse cursor"),
    ("r", "reset view"),
    ("s", "surface representation"),
    ("w", "wire representation"),
];

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// One line per binding: camera first, then the key commands
pub fn help_text() -> String {
    let camera = CAMERA_HELP
        .iter()
        .map(|(key, what)| format!("{key} : {what}"));
    let commands = Command::ALL
        .iter()
        .map(|cmd| format!("{} : {}", cmd.keys(), cmd.description()));
    camera.chain(commands).collect::<Vec<_>>().join("\n")
}

pub fn copyright_text(year: i32) -> String {
    format!("Meshmagick Viewer\nCopyright 2014-{year}, Ecole Centrale de Nantes")
}

pub fn help_annotation() -> TextAnnotation {
    TextAnnotation {
        corner: Corner::UpperRight,
        text: help_text(),
        max_font_size: 20.0,
        color: BLACK,
    }
}

pub fn copyright_annotation(year: i32) -> TextAnnotation {
    TextAnnotation {
        corner: Corner::LowerRight,
        text: copyright_text(year),
        max_font_size: 12.0,
        color: BLACK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command() {
        let text = help_text();
        for line in [
            "n : (un)show normals",
            "b : (un)show axes box",
            "h : (un)show Oxy plane",
            "x : save",
            "c : screenshot",
            "e/q : quit",
            "left mouse : rotate",
            "ctrl+left mouse : spin",
            "f : focus on the mouse cursor",
            "s : surface representation",
            "w : wire representation",
        ] {
            assert!(text.lines().any(|l| l == line), "missing '{line}' in\n{text}");
        }
    }

    #[test]
    fn test_camera_keys_stay_out_of_command_table() {
        for (key, _) in CAMERA_HELP.iter().filter(|(k, _)| k.len() == 1) {
            let event = crate::controller::KeyEvent::Char(key.chars().next().unwrap());
            assert!(Command::from_key(&event).is_none(), "'{key}' is bound twice");
        }
    }

    #[test]
    fn test_copyright_year() {
        assert_eq!(
            copyright_text(2031),
            "Meshmagick Viewer\nCopyright 2014-2031, Ecole Centrale de Nantes"
        );
        assert!(current_year() >= 2024);
    }
}
