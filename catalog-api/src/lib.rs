//! # Catalog API Server Library
//!
//! Core functionality for the catalog API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `forms`: Product form and version formset validation
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod forms;
pub mod routes;
