//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, token refresh, password recovery
//! - `account`: Password and email changes for the current user

pub mod account;
pub mod auth;
pub mod health;
