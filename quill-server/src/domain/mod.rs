pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod like;
pub(crate) mod post;
pub(crate) mod user;
