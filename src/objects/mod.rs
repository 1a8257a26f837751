//! # Object abstractions built on the coordination core.
//!
//! Defines the [`Lifecycle`] trait (the hooks an engine object implements)
//! and [`Inert`], a plain leaf implementation.

mod lifecycle;

pub use lifecycle::{Inert, Lifecycle};
