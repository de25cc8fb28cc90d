//! Database seeding functionality
//!
//! This module provides functionality to seed the database with initial data
//! that needs to exist when the application starts.

pub mod pipeline;

pub use pipeline::seed_default_pipeline;
