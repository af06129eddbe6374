pub mod cell_value;
pub mod dataset;

pub use cell_value::CellValue;
pub use dataset::{DatasetError, TabularDataset};
