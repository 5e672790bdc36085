use thiserror::Error;

/// Errors reported by the map and table constructors and by the
/// optional-key entry points.
///
/// Looking up a key that is not present is not an error: lookups return
/// `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MapError {
    /// An absent key was passed where a key is required.
    #[error("key is absent: a key is required to hash and compare entries")]
    MissingKey,

    /// A load factor that is not a finite, strictly positive number.
    #[error("invalid load factor {0}: expected a finite value greater than zero")]
    InvalidLoadFactor(f64),
}
