use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Author role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// System instruction message.
    #[serde(rename = "system")]
    System,
    /// Message authored by the user.
    #[serde(rename = "user")]
    Human,
    /// Message authored by the model.
    #[serde(rename = "assistant")]
    Ai,
}

impl Role {
    /// Returns the role string used on provider wire formats.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Human => "user",
            Self::Ai => "assistant",
        }
    }
}

/// A fully rendered chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Rendered text content.
    pub content: String,
}

impl Message {
    /// Creates a message with the given role and content.
    pub fn new<T: Into<String>>(role: Role, content: T) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A role-tagged template string with `{variable}` placeholders.
///
/// Templates are built once and never mutated; rendering substitutes
/// variables into a fresh [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Author role of the rendered message.
    pub role: Role,
    /// Template text with `{variable}` placeholders.
    pub template: String,
}

impl MessageTemplate {
    /// Creates a system message template.
    pub fn system<T: Into<String>>(template: T) -> Self {
        Self {
            role: Role::System,
            template: template.into(),
        }
    }

    /// Creates a human message template.
    pub fn human<T: Into<String>>(template: T) -> Self {
        Self {
            role: Role::Human,
            template: template.into(),
        }
    }

    /// Creates an AI message template.
    pub fn ai<T: Into<String>>(template: T) -> Self {
        Self {
            role: Role::Ai,
            template: template.into(),
        }
    }

    /// Renders this template against the given variables.
    ///
    /// # Errors
    /// Returns [`Error::Template`] if a placeholder has no bound value.
    pub fn render(&self, variables: &HashMap<String, String>) -> Result<Message> {
        let content = render_template(&self.template, variables)?;
        Ok(Message::new(self.role, content))
    }
}

/// Substitutes `{variable}` placeholders in `template`.
///
/// Literal braces are written `{{` and `}}`.
///
/// # Errors
/// Returns [`Error::Template`] if a placeholder is unclosed or references
/// a variable with no bound value.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(current) = chars.next() {
        match current {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    output.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => {
                            return Err(Error::Template(format!(
                                "unclosed placeholder '{{{name}' in template"
                            )));
                        }
                    }
                }
                let value = variables.get(&name).ok_or_else(|| {
                    Error::Template(format!("missing value for template variable '{name}'"))
                })?;
                output.push_str(value);
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                }
                output.push('}');
            }
            other => output.push(other),
        }
    }

    Ok(output)
}
