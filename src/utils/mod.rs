pub mod text;

pub use text::{truncate_bytes, truncate_with_marker};
