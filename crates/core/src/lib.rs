//! Core business logic for Scribe.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and the flows that
//! coordinate the post store with the external image store live here.
//!
//! # Modules
//!
//! - `blog` - Post lifecycle: create/update/delete with ownership checks
//! - `media` - Image validation and object-store access

pub mod blog;
pub mod media;
