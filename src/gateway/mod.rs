//! Recognition Gateway
//!
//! Turns a canvas snapshot plus the session's variable bindings into a list of
//! structured recognition results. The model is asked for a bare JSON array;
//! whatever prose it wraps around the array is discarded by locating the first
//! `[` and the last `]` in the response text.
//!
//! The gateway never fails past its own boundary: upstream errors and
//! unparseable responses both come back as a single synthetic result item, so
//! callers always render an array.

pub mod model;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub use model::{GeminiClient, ModelBackend, ModelError};

/// One recognized expression from the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// The expression as read from the canvas (or the variable name for
    /// assignment items)
    pub expr: String,
    /// The computed result
    pub result: String,
    /// Whether this item assigns `result` to the variable named by `expr`
    #[serde(default)]
    pub assign: bool,
}

impl RecognitionResult {
    /// Synthetic item for an unparseable model response
    fn parse_failure() -> Self {
        Self {
            expr: "Error processing image".to_string(),
            result: "Could not analyze the image".to_string(),
            assign: false,
        }
    }

    /// Synthetic item carrying an upstream error message
    fn upstream_failure(message: impl Into<String>) -> Self {
        Self {
            expr: "Error".to_string(),
            result: message.into(),
            assign: false,
        }
    }
}

/// Gateway from snapshot to structured results
pub struct RecognitionGateway {
    model: Arc<dyn ModelBackend>,
}

impl RecognitionGateway {
    /// Create a gateway over the given model backend
    pub fn new(model: Arc<dyn ModelBackend>) -> Self {
        Self { model }
    }

    /// Analyze a base64 PNG snapshot with the current variable bindings.
    ///
    /// Failures become synthetic items rather than errors, so callers never
    /// branch on an exception.
    pub async fn analyze(
        &self,
        png_base64: &str,
        bindings: &HashMap<String, String>,
    ) -> Vec<RecognitionResult> {
        let prompt = build_prompt(bindings);

        let text = match self.model.generate(&prompt, png_base64).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Model call failed: {}", e);
                return vec![RecognitionResult::upstream_failure(e.to_string())];
            }
        };

        debug!("Raw model response: {}", text);

        match extract_json_array(&text) {
            Some(items) => items,
            None => {
                warn!("Model response was not a parseable JSON array");
                vec![RecognitionResult::parse_failure()]
            }
        }
    }
}

/// Build the fixed instruction embedding the current variable bindings.
///
/// The rules mirror what the client expects back: plain arithmetic yields one
/// non-assigning item, solved equations yield one assigning item per variable,
/// word problems and abstract prompts yield one descriptive item.
fn build_prompt(bindings: &HashMap<String, String>) -> String {
    let vars_json = serde_json::to_string(bindings).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Analyze the mathematical expression in this image.
Your response MUST be in this EXACT format (no other text, just the JSON array):
[{{
  "expr": "the expression you see",
  "result": "the calculated result",
  "assign": false
}}]

For equations with variables return like this:
[{{
  "expr": "x",
  "result": "2",
  "assign": true
}}, {{
  "expr": "y",
  "result": "5",
  "assign": true
}}]

Here are the variable values if needed: {vars_json}

Rules:
1. For simple math (2+2): Return [{{"expr": "2+2", "result": "4", "assign": false}}]
2. For equations (x^2+2x+1=0): Return array of solutions with assign:true
3. For variable assignments (x=4): Return with assign:true
4. For word problems: Return [{{"expr": "problem description", "result": "answer", "assign": false}}]
5. For abstract concepts: Return [{{"expr": "description", "result": "concept", "assign": false}}]

IMPORTANT: Response must be valid JSON. No explanation text, ONLY the JSON array."#
    )
}

/// Locate the JSON array inside free model text and parse it.
///
/// Takes the substring between the first `[` and the last `]`. A missing
/// `assign` field deserializes as false.
fn extract_json_array(text: &str) -> Option<Vec<RecognitionResult>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}
