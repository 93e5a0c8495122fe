use crate::error::Error;

mod email;
mod length;

pub use email::{EmailValidator, InvalidEmail};
pub use length::{InvalidLength, LengthValidator};

/// A trait for data validation.
pub trait Validator<T: ?Sized> {
    /// The error type.
    type Error: Into<Error>;

    /// Validates the data.
    fn validate(&self, data: &T) -> Result<(), Self::Error>;
}
