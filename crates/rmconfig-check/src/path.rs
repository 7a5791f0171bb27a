//! Paths addressing nodes inside a document.

use std::fmt;

/// Name of the document root in rendered paths.
pub const ROOT: &str = "root";

/// One step from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// A named field, rendered as `.name`.
    Field(&'static str),
    /// An element of a named sequence field, rendered as `.name[index]`.
    Element(&'static str, usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Element(name, index) => write!(f, ".{name}[{index}]"),
        }
    }
}

/// The chain of segments from the root to the node being visited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The path of the document root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Descend into a child.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Return to the parent.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Number of segments below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
