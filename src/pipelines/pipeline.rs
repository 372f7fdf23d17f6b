//! Pipeline trait.
use crate::error::Error;

/// A runnable conversion.
///
/// Generic over the return type so that pipelines producing reports
/// (or nothing at all) share the same trait.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
