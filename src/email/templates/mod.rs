//! Template variable substitution
//!
//! Placeholders use the `{{variable_name}}` syntax, where the name is made of
//! word characters only. Substitution is literal: placeholders without a
//! value are left in the output unchanged.

use crate::domain::TemplateVariables;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{(\w+)\}\}").unwrap();
}

/// Distinct placeholder names in `text`
pub fn extract_variables(text: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Sorted union of the placeholders in subject and body
pub fn template_variables(subject: &str, body: &str) -> Vec<String> {
    let mut names = extract_variables(subject);
    names.extend(extract_variables(body));
    names.into_iter().collect()
}

/// Text form of a variable value: strings verbatim, null as empty, anything else as compact JSON
pub fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Template rendering engine with variable substitution
#[derive(Debug, Default, Clone)]
pub struct TemplateEngine {
    variables: BTreeMap<String, String>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine preloaded with request variables
    pub fn from_variables(variables: &TemplateVariables) -> Self {
        let mut engine = Self::new();
        engine.set_all(variables.iter().map(|(k, v)| (k.clone(), stringify(v))));
        engine
    }

    /// Set a variable value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Set multiple variables from an iterator
    pub fn set_all<I, K, V>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in iter {
            self.variables.insert(k.into(), v.into());
        }
        self
    }

    /// Render a template string, replacing {{variable}} with values
    pub fn render(&self, template: &str) -> String {
        let mut result = template.to_string();

        for (key, value) in &self.variables {
            let placeholder = format!("{{{{{}}}}}", key);
            result = result.replace(&placeholder, value);
        }

        result
    }

    /// Render subject and body independently
    pub fn render_message(&self, subject: &str, body: &str) -> RenderedMessage {
        RenderedMessage {
            subject: self.render(subject),
            body: self.render(body),
        }
    }
}

/// Subject and body with variables substituted
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}
