//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Password registration and login (bcrypt)
//! - Google OAuth access-token login
//! - JWT token generation and validation
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod routes;
pub mod service;
pub mod token;
pub mod validators;


pub use extractors::AuthedUser;
pub use models::{AuthResponse, PublicProfile, User};
pub use routes::auth_routes;
pub use service::{AuthError, AuthService};
