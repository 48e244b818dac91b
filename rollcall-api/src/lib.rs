//! # Rollcall API Server Library
//!
//! Contact book and class roster served over HTTP.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session layer
//! - `config`: Configuration from the environment
//! - `error`: Error type and HTTP response mapping
//! - `forms`: Form views, form keys and validation
//! - `middleware`: Security headers and signed URL verification
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
