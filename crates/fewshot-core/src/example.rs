use serde::{Deserialize, Serialize};

/// A single few-shot example: a prior request and its generated answer.
///
/// Examples are constructed by an external loader and consumed read-only
/// by the prompt assembler and example selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// The user request this example answers.
    pub intention: String,
    /// The generated answer, absent until produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Optional external identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Example {
    /// Creates an example with only an intention.
    pub fn new<T: Into<String>>(intention: T) -> Self {
        Self {
            intention: intention.into(),
            detail: None,
            id: None,
        }
    }

    /// Sets the answer text.
    #[must_use]
    pub fn with_detail<T: Into<String>>(mut self, detail: T) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets the external identifier.
    #[must_use]
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fields() {
        let example = Example::new("a red poster")
            .with_detail("Use a bold sans-serif headline.")
            .with_id("ex-1");

        assert_eq!(example.intention, "a red poster");
        assert_eq!(example.detail.as_deref(), Some("Use a bold sans-serif headline."));
        assert_eq!(example.id.as_deref(), Some("ex-1"));
    }

    #[test]
    fn optional_fields_skipped_in_json() {
        let example = Example::new("a logo");
        let json = serde_json::to_string(&example).unwrap();
        assert_eq!(json, r#"{"intention":"a logo"}"#);
    }
}
