//! Agent population labels.

use std::borrow::Cow;
use std::fmt;

use crate::{CoreError, CoreResult};

/// Label distinguishing agent populations (e.g. `"fast"` / `"slow"`).
///
/// The tag never changes routing mechanics by itself; it selects
/// class-specific edges in the router and is used to filter histories for
/// reporting.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassTag(Cow<'static, str>);

impl ClassTag {
    /// Tag used for agents created by nodes that do not name a class.
    pub const DEFAULT: ClassTag = ClassTag(Cow::Borrowed("default"));

    /// Build a tag from a static string without allocating.
    pub const fn from_static(tag: &'static str) -> Self {
        ClassTag(Cow::Borrowed(tag))
    }

    /// Build a tag from any string, rejecting the empty string.
    pub fn new(tag: impl Into<Cow<'static, str>>) -> CoreResult<Self> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(CoreError::EmptyClassTag);
        }
        Ok(ClassTag(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClassTag {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ClassTag {
    fn from(tag: &'static str) -> Self {
        ClassTag::from_static(tag)
    }
}
