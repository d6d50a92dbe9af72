//! WordPress publishing adapter.
//!
//! Implements the [`pipeline::CmsPublisher`] trait over the WordPress REST API.
//! A publish attempt optionally uploads the first image found in the post body
//! as featured media, then creates a draft post under a fixed category.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Basic auth, multipart upload, temporary files and the
//! REST schema live here. The [`pipeline`] crate sees only
//! [`pipeline::CmsPublisher`] and the [`pipeline::PublishResult`] it returns.

mod media;
mod publisher;

pub use publisher::{excerpt_for, WordPressConfig, WordPressPublisher};
