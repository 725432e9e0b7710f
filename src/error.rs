use thiserror::Error;

/// Errors raised by [`crate::Map`] construction, invariant checks, and serialization.
///
/// Most operations on [`crate::Map`] are infallible (they panic on internal corruption rather
/// than returning an error, per the single-writer contract described in the crate docs); this
/// type exists for the handful of entry points that are meant to be recoverable.
#[derive(Debug, Error)]
pub enum MapError {
    /// The requested initial capacity could not be honored (e.g. it would overflow `usize`
    /// arithmetic once divided by the load factor and rounded up to a power of two).
    #[error("invalid capacity hint: {0}")]
    InvalidCapacity(usize),
    /// The load factor is not in `(0, 1]`.
    #[error("invalid load factor: {0}")]
    InvalidLoadFactor(f64),
    /// An internal invariant was violated. This indicates the map has been corrupted, most
    /// likely by unsynchronized concurrent access; the map must not be used afterward.
    #[error("map corruption detected: {0}")]
    Corruption(&'static str),
    /// The external byte representation did not match the format this crate writes.
    #[cfg(feature = "serialize")]
    #[error("serialization format error: {0}")]
    Serialization(String),
}
