//! Canvas Session Engine
//!
//! Models one drawing session: the raster surface strokes land on, the
//! variable bindings accumulated from assignment results, the overlay list,
//! and the notes box. All mutation goes through explicit entry points
//! (pointer events, reset, transcript, recognition-applied) rather than
//! ambient state.

pub mod bindings;
pub mod overlay;

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::canvas::{drawn_bounds, CanvasSurface, Rgba};
use crate::config::CanvasSettings;
use crate::gateway::RecognitionResult;

pub use bindings::VariableBindings;
pub use overlay::{format_expression, NotesBox, Overlay, Point};

/// An encoded snapshot of the session, sent to the gateway for one request.
/// Built fresh per recognition call and not retained afterwards.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// PNG data URI of the current surface
    pub image: String,
    /// Copy of the current variable bindings
    pub bindings: HashMap<String, String>,
}

/// State of one drawing session
#[derive(Debug, Clone)]
pub struct SessionState {
    settings: CanvasSettings,
    surface: CanvasSurface,
    color: Rgba,
    /// Last pointer position while a stroke is in progress
    stroke_anchor: Option<(i64, i64)>,
    bindings: VariableBindings,
    overlays: Vec<Overlay>,
    notes: NotesBox,
    /// Latest transcribed phrase, if any
    transcript: Option<String>,
}

impl SessionState {
    /// Create a session with a blank surface
    pub fn new(settings: CanvasSettings) -> Self {
        let surface = CanvasSurface::new(settings.width, settings.height);
        let color = settings.color;
        Self {
            settings,
            surface,
            color,
            stroke_anchor: None,
            bindings: VariableBindings::new(),
            overlays: Vec::new(),
            notes: NotesBox::default(),
            transcript: None,
        }
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn bindings(&self) -> &VariableBindings {
        &self.bindings
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn notes(&self) -> &NotesBox {
        &self.notes
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke_anchor.is_some()
    }

    /// Change the stroke color for subsequent strokes
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Begin a stroke at the pointer position
    pub fn pointer_down(&mut self, x: i64, y: i64) {
        self.surface
            .draw_line((x, y), (x, y), self.color, self.settings.stroke_width);
        self.stroke_anchor = Some((x, y));
    }

    /// Extend the in-progress stroke; ignored when no stroke is active
    pub fn pointer_move(&mut self, x: i64, y: i64) {
        if let Some(last) = self.stroke_anchor {
            self.surface
                .draw_line(last, (x, y), self.color, self.settings.stroke_width);
            self.stroke_anchor = Some((x, y));
        }
    }

    /// End the in-progress stroke
    pub fn pointer_up(&mut self) {
        self.stroke_anchor = None;
    }

    /// Encode the current surface and bindings for one recognition request
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            image: self.surface.to_data_uri()?,
            bindings: self.bindings.as_map().clone(),
        })
    }

    /// Apply a batch of recognition results.
    ///
    /// Assignment items overwrite their variable binding; every item gains an
    /// `<expr> = <result>` overlay anchored at the center of the drawn
    /// bounding box, and the surface is cleared for the next drawing. Results
    /// are appended in order; the source UI staggered them with a cosmetic
    /// delay, which is presentation, not state.
    pub fn apply_results(&mut self, results: &[RecognitionResult]) {
        if results.is_empty() {
            // nothing rendered, keep the drawing
            return;
        }

        let bounds = drawn_bounds(&self.surface);
        let (cx, cy) = bounds.center();
        let anchor = Point::new(cx, cy);

        for item in results {
            if item.assign {
                debug!("Binding {} = {}", item.expr, item.result);
                self.bindings.assign(&item.expr, &item.result);
            }
            self.overlays
                .push(Overlay::new(format!("{} = {}", item.expr, item.result), anchor));
        }

        self.surface.clear();
        info!(
            "Applied {} recognition results ({} bindings held)",
            results.len(),
            self.bindings.len()
        );
    }

    /// Move one overlay to a new position. Returns false if the overlay does
    /// not exist.
    pub fn move_overlay(&mut self, id: Uuid, position: Point) -> bool {
        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(overlay) => {
                overlay.position = position;
                true
            }
            None => false,
        }
    }

    /// Replace the notes content
    pub fn set_notes(&mut self, content: impl Into<String>) {
        self.notes.content = content.into();
    }

    /// Move the notes box
    pub fn move_notes(&mut self, position: Point) {
        self.notes.position = position;
    }

    /// Replace the current drawing with a transcribed phrase, stamped in the
    /// center of the surface
    pub fn apply_transcript(&mut self, text: &str) {
        self.surface.clear();
        let (width, height) = self.surface.dimensions();
        self.surface.draw_text(
            text,
            width as i64 / 2,
            height as i64 / 2,
            2,
            self.color,
        );
        self.transcript = Some(text.to_string());
    }

    /// Full session reset: raster, overlays, bindings, notes, and transcript
    /// all return to their initial state. The stroke color is kept.
    pub fn reset(&mut self) {
        self.surface.clear();
        self.stroke_anchor = None;
        self.overlays.clear();
        self.bindings.clear();
        self.notes = NotesBox::default();
        self.transcript = None;
        info!("Session reset");
    }
}
