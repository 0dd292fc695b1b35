//! Generation clients

pub mod image;
pub mod text;

// Re-export for convenience
pub use image::ImageClient;
pub use text::TextClient;
