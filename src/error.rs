//! # Error Types
//!
//! All fallible operations in the crate return [`NotateError`].
//!
//! Errors are raised while loading a performance, never while encoding one:
//! once a [`Performance`](crate::Performance) has been read, every pitch, key
//! and time signature in it is known to be well formed and the measure walk is
//! total.
//!
//! ## Error Types
//! - `InvalidPitch` - pitch text that is not `<step><accidental?><octave>`
//! - `InvalidKey` - key number outside 0-23
//! - `InvalidTimeSignature` - zero numerator or denominator
//! - `InputError` - the input document could not be read

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotateError {
    /// Pitch text could not be parsed.
    ///
    /// # Example
    /// ```
    /// # use notate::NotateError;
    /// let err = NotateError::InvalidPitch("H4".to_string());
    /// assert_eq!(err.to_string(), "Invalid pitch 'H4': expected <step><accidental?><octave>");
    /// ```
    #[error("Invalid pitch '{0}': expected <step><accidental?><octave>")]
    InvalidPitch(String),

    /// Key number outside the major (0-11) / minor (12-23) range.
    #[error("Invalid key number {0}: expected 0-23")]
    InvalidKey(u8),

    /// Time signature with a zero component.
    #[error("Invalid time signature {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },

    /// The input document could not be deserialized.
    #[error("Invalid input: {0}")]
    InputError(String),
}
