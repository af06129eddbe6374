pub mod sheets;
pub mod tabular;

// Re-export commonly used types
pub use sheets::*;
pub use tabular::*;
