//! Paths for locating nested child results and per-child context overrides.
//!
//! Composite validators key their children either by field name (`object_props`,
//! `props`, `form`) or by position (`every`, `all`, `array_of`, ...). A
//! [`PathSegment`] names one such child; a [`ResultPath`] chains segments to reach
//! a result nested several combinators deep.

use std::fmt::{self, Display};
use std::str::FromStr;

/// One step into a composite result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A keyed child (an object property or form field).
    Field(String),
    /// A positional child (an array element or a sequence member).
    Index(usize),
}

impl PathSegment {
    /// Creates a field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates an index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// A path to a child result nested inside composite results.
///
/// Paths display and parse as `address.lines[0]`, with dotted field names and
/// bracketed indices.
///
/// # Example
///
/// ```rust
/// use verdict::ResultPath;
///
/// let path = ResultPath::root().push_field("addresses").push_index(1).push_field("zip");
/// assert_eq!(path.to_string(), "addresses[1].zip");
///
/// let parsed: ResultPath = "addresses[1].zip".parse().unwrap();
/// assert_eq!(parsed, path);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResultPath {
    segments: Vec<PathSegment>,
}

impl ResultPath {
    /// Creates an empty path, addressing the result itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// Returns a new path with `segment` appended.
    pub fn push(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns true if the path has no segments.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }
}

impl Display for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Field(_)) {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Error returned when a string is not a well-formed result path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid result path '{input}': {reason}")]
pub struct PathParseError {
    input: String,
    reason: &'static str,
}

impl FromStr for ResultPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| PathParseError {
            input: input.to_owned(),
            reason,
        };

        let mut segments = Vec::new();
        for part in input.split('.').filter(|part| !part.is_empty()) {
            let (name, mut rest) = match part.find('[') {
                Some(open) => (&part[..open], &part[open..]),
                None => (part, ""),
            };
            if !name.is_empty() {
                segments.push(PathSegment::Field(name.to_owned()));
            }
            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| fail("unclosed '['"))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| fail("index is not a number"))?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(fail("unexpected text after ']'"));
                }
            }
        }

        Ok(Self { segments })
    }
}
