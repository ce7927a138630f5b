use std::fmt;

/// Fully-qualified dotted path of a package or classifier.
///
/// The root package has no segments.
///
/// # Examples
///
/// ```
/// use calltower_core::FqName;
///
/// let pkg = FqName::from_dotted("kotlin.io");
/// assert_eq!(pkg.to_string(), "kotlin.io");
///
/// let println = pkg.child("println");
/// assert_eq!(println.short_name(), Some("println"));
/// assert_eq!(println.parent(), Some(pkg));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FqName {
    segments: Vec<String>,
}

impl FqName {
    /// The root package.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create from explicit segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Create from a dotted string (e.g., "kotlin.collections").
    ///
    /// Empty segments are dropped, so "" and "." are both the root package.
    pub fn from_dotted(s: &str) -> Self {
        Self {
            segments: s
                .split('.')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Check if this is the root package.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, if any.
    pub fn short_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Append a segment.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Drop the last segment. The root package has no parent.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for FqName {
    fn from(s: &str) -> Self {
        Self::from_dotted(s)
    }
}
