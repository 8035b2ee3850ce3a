//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into form-level operations.
//! - Keep front ends decoupled from storage details.

pub mod form_controller;
