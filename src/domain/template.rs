//! Message template domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored message template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageTemplate {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub body: String,
    /// Placeholder names found in subject and body, sorted
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Template as handed to storage for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub subject: String,
    pub body: String,
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplateInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1, max = 65535))]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTemplateInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 65535))]
    pub body: Option<String>,
}

/// Listing filter for templates
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateQuery {
    /// Case-insensitive match on name or subject
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for TemplateQuery {
    fn default() -> Self {
        Self {
            search: None,
            offset: 0,
            limit: 20,
        }
    }
}

impl TemplateQuery {
    pub fn matches(&self, template: &MessageTemplate) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                template.name.to_lowercase().contains(&term)
                    || template.subject.to_lowercase().contains(&term)
            }
        }
    }
}

/// Reference to a template by id or by unique name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateRef {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}
