//! Location tracking for error messages
//!
//! [`JsonPath`] is a stack of segments describing where the decoder currently is inside the
//! input document. It is only ever rendered when an error is raised, so decoding never pays
//! for string formatting on the happy path.
//!
//! Pushing goes through [`JsonPath::enter`], which returns a [`PathScope`] guard. The guard
//! derefs to the path, so nested decoders keep pushing through it, and it pops its segment when
//! dropped. Every push is therefore matched by exactly one pop, including when a decoder
//! returns early with `?`.

use std::fmt::{self, Write as _};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// One step of a [`JsonPath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Position inside a JSON array, rendered as `[i]`
    Index(usize),
    /// Key inside a JSON object, rendered as `/key`
    Key(Arc<str>),
}

impl PathSegment {
    /// Segment pushed before iterating siblings; always replaced before anything can fail
    pub(crate) const PLACEHOLDER: PathSegment = PathSegment::Index(0);
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "[{}]", index),
            PathSegment::Key(key) => write!(f, "/{}", key),
        }
    }
}

/// Reusable stack of [`PathSegment`]s
#[derive(Debug, Default, Clone)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a segment that stays until the returned guard is dropped
    pub fn enter(&mut self, segment: PathSegment) -> PathScope<'_> {
        self.segments.push(segment);
        PathScope { path: self }
    }

    /// Overwrite the innermost segment in place
    ///
    /// Used when walking siblings so that N elements cost one push and one pop.
    pub fn replace_last(&mut self, segment: PathSegment) {
        match self.segments.last_mut() {
            Some(last) => *last = segment,
            None => debug_assert!(false, "replace_last on an empty path"),
        }
    }

    fn pop(&mut self) {
        let popped = self.segments.pop();
        debug_assert!(popped.is_some(), "pop on an empty path");
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Render the path, e.g. `[1]/a/b`. The root renders as the empty string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.segments.len() * 8);
        for segment in &self.segments {
            // writing into a String cannot fail
            let _ = write!(out, "{}", segment);
        }
        out
    }

    /// Render every segment except the innermost one
    pub(crate) fn render_parent(&self) -> String {
        let parent = &self.segments[..self.segments.len().saturating_sub(1)];
        parent.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Guard returned by [`JsonPath::enter`]; pops its segment on drop
#[derive(Debug)]
pub struct PathScope<'p> {
    path: &'p mut JsonPath,
}

impl Deref for PathScope<'_> {
    type Target = JsonPath;

    fn deref(&self) -> &JsonPath {
        self.path
    }
}

impl DerefMut for PathScope<'_> {
    fn deref_mut(&mut self) -> &mut JsonPath {
        self.path
    }
}

impl Drop for PathScope<'_> {
    fn drop(&mut self) {
        self.path.pop();
    }
}
