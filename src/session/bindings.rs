//! Variable bindings accumulated across recognition calls.

use std::collections::HashMap;

/// Session table of variable name to last-assigned value.
///
/// Keys are unique; a later assignment to the same name replaces the value.
/// There is no deletion path; the table lives until the session resets.
#[derive(Debug, Clone, Default)]
pub struct VariableBindings {
    values: HashMap<String, String>,
}

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a binding
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a variable's current value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Discard every binding (session reset)
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The underlying map, as sent to the gateway
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.values
    }
}
