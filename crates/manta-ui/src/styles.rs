//! Semantic styling for manta-brew output.
//!
//! Colors follow the Ayu Dark palette. Only outcomes get color: pass, fail
//! and the field a violation points at.

use manta_formula::types::{Violation, ViolationKind};
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue

/// Pass icon (checkmark).
pub const ICON_PASS: &str = "\u{2713}";
/// Fail icon (cross).
pub const ICON_FAIL: &str = "\u{2717}";

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

/// Renders text in bold.
pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Violation kinds that block publishing are red; template shape problems
/// that only matter while authoring are yellow.
pub fn render_kind(kind: ViolationKind) -> String {
    match kind {
        ViolationKind::MalformedTemplate | ViolationKind::MissingField => {
            render_warn(kind.as_str())
        }
        _ => render_fail(kind.as_str()),
    }
}

/// One report line: `  ✗ sha256 [invalid-checksum] placeholder ... was not substituted`.
pub fn render_violation(v: &Violation) -> String {
    format!(
        "  {} {} [{}] {}",
        render_fail(ICON_FAIL),
        render_accent(v.field.as_str()),
        render_kind(v.kind),
        v.message
    )
}
