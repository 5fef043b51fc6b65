//! Core types and trait definitions for the family tree store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the person and relationship models, the [`Entity`] contract, the
//! [`store::DocumentStore`] seam that storage backends implement, and the
//! repositories and services built on top of that seam.

pub mod context;
pub mod entity;
pub mod error;
pub mod person;
pub mod query;
pub mod relationship;
pub mod repository;
pub mod service;
pub mod store;

pub use context::OpContext;
pub use entity::{DocumentMeta, Entity};
pub use error::{Error, Result};
