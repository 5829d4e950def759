//! Errors reported by keyed [`SkipMap`][crate::SkipMap] operations.

use thiserror::Error;

/// Errors returned by keyed operations on a [`SkipMap`][crate::SkipMap].
///
/// A failed operation never modifies the map: the search that detects the
/// problem completes before any link is rewritten.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(
    clippy::module_name_repetitions,
    reason = "Using 'Error' would be too generic and may cause confusion."
)]
#[non_exhaustive]
pub enum SkipMapError {
    /// The key has no place in the map's ordering.
    ///
    /// This is the case for a key the comparator cannot order against itself
    /// (such as `f64::NAN` under [`PartialOrd`]), or against a key already
    /// stored in the map.
    #[error("key has no place in the map's ordering.")]
    InvalidKey,
    /// No entry exists for the key.
    #[error("key not found.")]
    NotFound,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::SkipMapError;

    #[test]
    fn messages() {
        assert_eq!(
            SkipMapError::InvalidKey.to_string(),
            "key has no place in the map's ordering."
        );
        assert_eq!(SkipMapError::NotFound.to_string(), "key not found.");
    }
}
