//! HTTP middleware: authentication extraction and error mapping.

pub mod auth;
pub mod error;
