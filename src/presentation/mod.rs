//! HTTP presentation layer: middleware and response models

pub mod middleware;
pub mod models;
