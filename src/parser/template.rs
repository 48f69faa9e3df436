//! Compiled template representation

use std::fmt;

/// A single compiled piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim into the output
    Literal(String),
    /// Reference to a variable, e.g. `hostname` or `env_PATH`
    Variable(String),
}

impl Segment {
    /// The literal text or the variable reference name
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(text) => text,
            Segment::Variable(name) => name,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Segment::Variable(_))
    }
}

/// An ordered, immutable sequence of segments produced by parsing.
///
/// A template can be rendered any number of times; rendering never
/// re-parses the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// All segments in source order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the template has no segments (empty source text)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names of referenced variables, in order of appearance
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

/// Canonical source form: variables as `${name}`, dollars as `$$`.
///
/// Names starting with a character outside `[0-9A-Za-z_]` cannot be
/// bracketed and are written as `$name`.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(&text.replace('$', "$$"))?,
                Segment::Variable(name)
                    if name.starts_with(|c: char| !(c.is_ascii_alphanumeric() || c == '_')) =>
                {
                    write!(f, "${}", name)?
                }
                Segment::Variable(name) => write!(f, "${{{}}}", name)?,
            }
        }
        Ok(())
    }
}
