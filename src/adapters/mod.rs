pub mod archive;
pub mod csv;
pub mod google;
pub mod memory;
