//! Domain rejections with stable error codes.

mod error_code;
mod rejection;

pub use error_code::ErrorCode;
pub use rejection::{ExtractRejection, OrReject, Rejection};
