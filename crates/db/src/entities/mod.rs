//! `SeaORM` entity definitions.

pub mod posts;
pub mod users;
