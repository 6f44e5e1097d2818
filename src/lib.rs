//! Folio - A multi-weblog publishing platform with built-in full-text search
//!
//! This library provides the core functionality for the Folio weblog system.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod rendering;
pub mod search;
pub mod services;
