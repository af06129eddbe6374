pub mod grid;
pub mod spreadsheet_id;

pub use grid::{dataset_to_grid, Grid, TOP_LEFT};
pub use spreadsheet_id::SpreadsheetId;
