//! Cross-reference attribute wrapper.
//!
//! This module provides `CrossRef`, the value attached to a primary record
//! for an attribute sourced from a secondary query.

/// An attribute joined onto a primary record from a secondary query.
///
/// `Unknown` is distinct from any value of `A`: a missing `is_icre` flag is
/// never read back as `false`.
///
/// With the `serde` feature, `Known(value)` serializes as `value` and
/// `Unknown` as the string `"unknown"`.
///
/// # Examples
///
/// ```
/// use locus_types::CrossRef;
///
/// let known = CrossRef::Known(true);
/// let unknown: CrossRef<bool> = CrossRef::Unknown;
///
/// assert_eq!(known.known(), Some(&true));
/// assert!(unknown.is_unknown());
/// assert_ne!(unknown, CrossRef::Known(false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossRef<A> {
    /// The secondary query returned a value for this key.
    Known(A),
    /// No value is available for this key.
    Unknown,
}

impl<A> Default for CrossRef<A> {
    fn default() -> Self {
        Self::Unknown
    }
}

impl<A> CrossRef<A> {
    /// Marker string used when serializing `Unknown`.
    pub const UNKNOWN_MARKER: &'static str = "unknown";

    /// Wraps an optional lookup result.
    pub fn from_option(value: Option<A>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Unknown,
        }
    }

    /// Returns the known value, if any.
    pub fn known(&self) -> Option<&A> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Returns true if no value is available.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Maps the known value.
    pub fn map<B, F: FnOnce(A) -> B>(self, f: F) -> CrossRef<B> {
        match self {
            Self::Known(v) => CrossRef::Known(f(v)),
            Self::Unknown => CrossRef::Unknown,
        }
    }
}

#[cfg(feature = "serde")]
impl<A: serde::Serialize> serde::Serialize for CrossRef<A> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => v.serialize(serializer),
            Self::Unknown => serializer.serialize_str(Self::UNKNOWN_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_option() {
        assert_eq!(CrossRef::from_option(Some(3)), CrossRef::Known(3));
        assert_eq!(CrossRef::<u8>::from_option(None), CrossRef::Unknown);
        assert_eq!(CrossRef::<u8>::default(), CrossRef::Unknown);
    }

    #[test]
    fn test_map_preserves_unknown() {
        let unknown: CrossRef<bool> = CrossRef::Unknown;
        assert_eq!(unknown.map(|b| !b), CrossRef::Unknown);
        assert_eq!(CrossRef::Known(true).map(|b| !b), CrossRef::Known(false));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_marker() {
        let known = serde_json::to_value(CrossRef::Known(true)).unwrap();
        let unknown = serde_json::to_value(CrossRef::<bool>::Unknown).unwrap();
        assert_eq!(known, serde_json::json!(true));
        assert_eq!(unknown, serde_json::json!("unknown"));
    }
}
