//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec, validation and repository calls into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod beat_service;
