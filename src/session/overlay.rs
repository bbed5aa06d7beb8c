//! Result overlays and the notes box.
//!
//! Overlays are rendered solved expressions, each independently draggable.
//! They are anchored where the source strokes were drawn and survive until the
//! session resets.

use uuid::Uuid;

/// A position on the canvas, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rendered solved expression, draggable independently of the canvas
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Stable identifier for drag targeting
    pub id: Uuid,
    /// Raw display string, `<expr> = <result>`
    pub text: String,
    /// Current position
    pub position: Point,
}

impl Overlay {
    pub fn new(text: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            position,
        }
    }

    /// The text with display formatting applied
    pub fn display_text(&self) -> String {
        format_expression(&self.text)
    }
}

/// Free-text notes box, draggable like an overlay
#[derive(Debug, Clone)]
pub struct NotesBox {
    pub content: String,
    pub position: Point,
}

impl Default for NotesBox {
    fn default() -> Self {
        Self {
            content: String::new(),
            position: Point::new(10.0, 200.0),
        }
    }
}

/// Format an expression for display: unwrap simple LaTeX commands and space
/// out operators, mapping `*` and `/` to their typographic forms.
pub fn format_expression(expr: &str) -> String {
    let stripped = strip_latex_commands(expr);

    let mut out = String::with_capacity(stripped.len() * 2);
    for c in stripped.chars() {
        match c {
            '=' => out.push_str(" = "),
            '+' => out.push_str(" + "),
            '-' => out.push_str(" - "),
            '*' => out.push_str(" × "),
            '/' => out.push_str(" ÷ "),
            _ => out.push(c),
        }
    }
    out
}

/// Replace `\command{arg}` occurrences with `arg`. Malformed sequences are
/// left untouched.
fn strip_latex_commands(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut rest = expr;

    while let Some(start) = rest.find('\\') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find('{').and_then(|open| {
            after[open + 1..]
                .find('}')
                .map(|close| (open, open + 1 + close))
        }) {
            Some((open, close)) if !after[..open].is_empty() => {
                out.push_str(&after[open + 1..close]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('\\');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_spacing() {
        assert_eq!(format_expression("2+2=4"), "2 + 2 = 4");
        assert_eq!(format_expression("6*7"), "6 × 7");
        assert_eq!(format_expression("8/2"), "8 ÷ 2");
        assert_eq!(format_expression("5-3"), "5 - 3");
    }

    #[test]
    fn test_latex_unwrap() {
        assert_eq!(strip_latex_commands(r"\sqrt{16}"), "16");
        assert_eq!(format_expression(r"\boxed{42}"), "42");
    }

    #[test]
    fn test_malformed_latex_left_alone() {
        assert_eq!(strip_latex_commands(r"\alpha"), r"\alpha");
        assert_eq!(strip_latex_commands(r"a\{b"), r"a\{b");
    }

    #[test]
    fn test_overlay_display_text() {
        let overlay = Overlay::new("x=4", Point::new(0.0, 0.0));
        assert_eq!(overlay.display_text(), "x = 4");
    }

    #[test]
    fn test_overlay_ids_are_unique() {
        let a = Overlay::new("a", Point::default());
        let b = Overlay::new("b", Point::default());
        assert_ne!(a.id, b.id);
    }
}
