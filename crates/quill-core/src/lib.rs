//! # Quill Core
//!
//! The domain layer of the Quill blog CMS.
//! This crate contains pure business logic with zero infrastructure
//! dependencies: the content lifecycle state machine, the access-control
//! policy, the slug generator, and the workflow orchestrator that composes
//! them on top of trait ports.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod slug;
pub mod text;
pub mod workflow;

pub use error::DomainError;
pub use workflow::Workflow;
