use serde_json::Value;

use crate::domain::tabular::TabularDataset;

/// Anchor of the single populated region of a created spreadsheet.
pub const TOP_LEFT: &str = "A1";

/// Row-major block of cell values as the Sheets API expects them.
pub type Grid = Vec<Vec<Value>>;

/// Header row followed by one row per dataset row.
/// Missing values are written as empty strings, nothing else is coerced.
pub fn dataset_to_grid(dataset: &TabularDataset) -> Grid {
    let header = dataset
        .columns()
        .iter()
        .map(|column| Value::String(column.clone()))
        .collect::<Vec<_>>();

    std::iter::once(header)
        .chain(
            dataset
                .rows()
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_json()).collect()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tabular::CellValue;
    use serde_json::json;

    fn sample_dataset() -> TabularDataset {
        TabularDataset::new(
            vec!["name".into(), "age".into(), "active".into()],
            vec![
                vec![
                    CellValue::from("Ana"),
                    CellValue::from(31i64),
                    CellValue::from(true),
                ],
                vec![
                    CellValue::from("Bruno"),
                    CellValue::Empty,
                    CellValue::from(false),
                ],
                vec![
                    CellValue::from("=SUM(A1:A2)"),
                    CellValue::from_f64(2.5).unwrap(),
                    CellValue::Empty,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_header_is_first_row() {
        let grid = dataset_to_grid(&sample_dataset());
        assert_eq!(grid[0], vec![json!("name"), json!("age"), json!("active")]);
    }

    #[test]
    fn test_grid_shape() {
        let dataset = sample_dataset();
        let grid = dataset_to_grid(&dataset);

        assert_eq!(grid.len(), dataset.row_count() + 1);
        assert!(grid.iter().all(|row| row.len() == dataset.column_count()));
    }

    #[test]
    fn test_missing_value_becomes_empty_string_in_place() {
        let grid = dataset_to_grid(&sample_dataset());
        assert_eq!(grid[2], vec![json!("Bruno"), json!(""), json!(false)]);
    }

    #[test]
    fn test_values_are_preserved_verbatim() {
        let dataset = sample_dataset();
        let grid = dataset_to_grid(&dataset);

        for (row, grid_row) in dataset.rows().iter().zip(grid.iter().skip(1)) {
            for (cell, value) in row.iter().zip(grid_row) {
                match cell {
                    CellValue::Empty => assert_eq!(value, &json!("")),
                    other => assert_eq!(value, &other.to_json()),
                }
            }
        }
        assert_eq!(grid[3][0], json!("=SUM(A1:A2)"));
        assert_eq!(grid[3][1], json!(2.5));
    }

    #[test]
    fn test_header_only_dataset() {
        let dataset = TabularDataset::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        assert_eq!(dataset_to_grid(&dataset), vec![vec![json!("a"), json!("b")]]);
    }
}
