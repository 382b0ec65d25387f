//! Formatfusion - upload an image, video or audio file and download it in another format
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod converter;
pub mod server;
