use google_sheets4::api::ValueRange;

use crate::domain::sheets::Grid;

pub trait ValueRangeFactory {
    fn from_grid(grid: Grid) -> Self;
}

impl ValueRangeFactory for ValueRange {
    fn from_grid(grid: Grid) -> Self {
        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(grid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheets::dataset_to_grid;
    use crate::domain::tabular::{CellValue, TabularDataset};
    use serde_json::json;

    #[test]
    fn test_from_grid() {
        let grid = vec![vec![json!("a"), json!("b")], vec![json!(1), json!("")]];
        let value_range = ValueRange::from_grid(grid.clone());
        assert_eq!(value_range.major_dimension, Some("ROWS".to_string()));
        assert_eq!(value_range.range, None, "Range is passed in the request path");
        assert_eq!(value_range.values, Some(grid));
    }

    #[test]
    fn test_from_dataset_grid() {
        let dataset = TabularDataset::new(
            vec!["name".into(), "score".into()],
            vec![vec![CellValue::from("x"), CellValue::Empty]],
        )
        .unwrap();

        let value_range = ValueRange::from_grid(dataset_to_grid(&dataset));
        assert_eq!(
            value_range.values,
            Some(vec![
                vec![json!("name"), json!("score")],
                vec![json!("x"), json!("")]
            ])
        );
    }
}
