//! Errors raised by the simulation core.

use std::fmt::{self, Debug};
use std::ops::RangeBounds;

/// Error raised when a simulation is constructed from invalid parameters.
///
/// Construction is the only fallible part of the core: once an engine
/// exists, every draw succeeds and every invariant is maintained by
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    InvalidParameter(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InvalidParameter(message) => {
                write!(f, "invalid parameter: {message}")
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Check that a numeric parameter lies within the given range.
pub fn check_num<T, R>(name: &str, num: T, range: R) -> Result<(), SimError>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        return Err(SimError::InvalidParameter(format!(
            "{name} must be in the range {range:?}, but is {num:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_num_accepts_in_range() {
        assert!(check_num("rate", 0.5, 0.0..=1.0).is_ok());
        assert!(check_num("rate", 1.0, 0.0..=1.0).is_ok());
    }

    #[test]
    fn check_num_rejects_out_of_range() {
        let err = check_num("rate", 1.5, 0.0..=1.0).unwrap_err();
        let SimError::InvalidParameter(message) = err;
        assert!(message.contains("rate"));
    }
}
