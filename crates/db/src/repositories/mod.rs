//! Repository implementations for data access.

mod post;
mod user;

pub use post::PostRepository;
pub use user::UserRepository;
