#![forbid(unsafe_code)]

//! Dotted property paths.
//!
//! A [`PropertyPath`] is a non-empty sequence of non-empty segments, written
//! canonically as `"bar.foo"`. Paths are cheap to clone (shared storage) and
//! compare by their canonical text.
//!
//! Operations accept anything implementing [`AsPath`]: a `&str`/`String`
//! (parsed on use) or an already-parsed `PropertyPath`, typically produced at
//! compile time by [`path!`](crate::path!).

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::PathError;

/// A parsed, non-empty dotted property path.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    dotted: Rc<str>,
    segments: Rc<[Rc<str>]>,
}

impl PropertyPath {
    /// Parse `"a.b.c"`.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let mut segments: Vec<Rc<str>> = Vec::new();
        for (index, segment) in path.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_owned(),
                    index,
                });
            }
            segments.push(Rc::from(segment));
        }
        Ok(Self {
            dotted: path.into(),
            segments: segments.into(),
        })
    }

    /// Build from individual segments. Segments must be non-empty and must
    /// not contain dots.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect();
        if let Some(index) = segments.iter().position(|s| s.contains('.')) {
            return Err(PathError::DottedSegment {
                segment: segments[index].clone(),
                index,
            });
        }
        Self::parse(&segments.join("."))
    }

    /// Path generated by [`path!`](crate::path!); identifiers are always
    /// valid segments.
    #[doc(hidden)]
    #[must_use]
    pub fn __from_idents(idents: &[&str]) -> Self {
        Self {
            dotted: idents.join(".").into(),
            segments: idents.iter().map(|s| Rc::<str>::from(*s)).collect(),
        }
    }

    /// Single-segment path for a property name taken verbatim.
    pub(crate) fn property(name: &str) -> Self {
        Self {
            dotted: name.into(),
            segments: Rc::from([Rc::<str>::from(name)]),
        }
    }

    /// Canonical dotted form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.dotted
    }

    /// All segments, in walk order.
    #[must_use]
    pub fn segments(&self) -> &[Rc<str>] {
        &self.segments
    }

    /// Number of segments (always at least one).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Segment at `index`.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(|s| &**s)
    }

    /// The final segment.
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.segments.last().map_or("", |s| &**s)
    }
}

impl FromStr for PropertyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted)
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({:?})", &*self.dotted)
    }
}

impl PartialEq<str> for PropertyPath {
    fn eq(&self, other: &str) -> bool {
        &*self.dotted == other
    }
}

impl PartialEq<&str> for PropertyPath {
    fn eq(&self, other: &&str) -> bool {
        &*self.dotted == *other
    }
}

/// Anything that can name a property path.
pub trait AsPath {
    fn as_path(&self) -> Result<PropertyPath, PathError>;
}

impl AsPath for PropertyPath {
    fn as_path(&self) -> Result<PropertyPath, PathError> {
        Ok(self.clone())
    }
}

impl AsPath for &PropertyPath {
    fn as_path(&self) -> Result<PropertyPath, PathError> {
        Ok((*self).clone())
    }
}

impl AsPath for &str {
    fn as_path(&self) -> Result<PropertyPath, PathError> {
        PropertyPath::parse(self)
    }
}

impl AsPath for String {
    fn as_path(&self) -> Result<PropertyPath, PathError> {
        PropertyPath::parse(self)
    }
}

impl AsPath for &String {
    fn as_path(&self) -> Result<PropertyPath, PathError> {
        PropertyPath::parse(self)
    }
}

/// Build a [`PropertyPath`] from accessor-style identifiers.
///
/// ```
/// use propchain::path;
///
/// let p = path!(bar.foo);
/// assert_eq!(p.as_str(), "bar.foo");
/// assert_eq!(p.depth(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($first:ident $(. $rest:ident)*) => {
        $crate::path::PropertyPath::__from_idents(&[
            stringify!($first) $(, stringify!($rest))*
        ])
    };
}
