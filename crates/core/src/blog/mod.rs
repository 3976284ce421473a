//! Blog post lifecycle.
//!
//! This module owns the flows with real failure modes: creating,
//! updating, and deleting posts while keeping the post record and the
//! externally stored image coordinated. It also enforces ownership on
//! every mutation. Read paths are plain pass-throughs to the
//! repository.

mod error;
mod service;
mod types;

pub use error::BlogError;
pub use service::{BlogRepository, BlogService};
pub use types::{BlogPost, CreatePostInput, PostWithAuthor, UpdatePostInput};
