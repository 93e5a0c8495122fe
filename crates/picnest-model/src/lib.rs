#![doc = include_str!("../README.md")]

mod comment;
mod pub_image;
mod publication;
mod rating;
mod tag;
mod user;

pub use comment::{Comment, CommentInput};
pub use pub_image::{ImageUpdate, PubImage};
pub use publication::{Publication, PublicationDetail, PublicationInput, PublicationUpdate};
pub use rating::{Rating, average_rating};
pub use tag::{MAX_TAGS_PER_PUBLICATION, Tag, validate_tag_name};
pub use user::{NewUser, SignupInput, User};

#[cfg(test)]
pub(crate) mod testing;
