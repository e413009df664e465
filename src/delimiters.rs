use std::fmt;

/// The pair of tag markers in effect while parsing a region of a template.
///
/// Mustache lets a template switch markers mid-stream with a `{{=<% %>=}}`
/// style tag; the parser tracks the active pair and stamps it onto any
/// `Section`/`InvertedSection` it opens, so that a lambda re-parsing the
/// section's `inner_text` later uses the same markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new<O, C>(open: O, close: C) -> Self
    where
        O: Into<String>,
        C: Into<String>,
    {
        Delimiters {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters::new("{{", "}}")
    }
}

impl fmt::Display for Delimiters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}...{}", self.open, self.close)
    }
}
