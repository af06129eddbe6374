use csv_to_sheets::application::{BatchReport, FileOutcome, MaterializeError};

/// One line per file, then a summary.
pub fn render(report: &BatchReport) -> Vec<String> {
    let mut lines = report.outcomes.iter().map(render_outcome).collect::<Vec<_>>();
    lines.push(format!(
        "{} uploaded, {} failed",
        report.succeeded(),
        report.failed()
    ));
    lines
}

fn render_outcome(outcome: &FileOutcome) -> String {
    match &outcome.result {
        Ok(spreadsheet_id) => format!("✅ {} → {}", outcome.file_name, spreadsheet_id),
        Err(error) => {
            let orphan = error
                .downcast_ref::<MaterializeError>()
                .and_then(MaterializeError::orphaned_spreadsheet)
                .map(|id| format!(" (spreadsheet {} left behind)", id))
                .unwrap_or_default();
            format!(
                "❌ {}: {}{}",
                outcome.file_name,
                error.current_context(),
                orphan
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv_to_sheets::application::FileError;
    use csv_to_sheets::domain::SpreadsheetId;
    use error_stack::{report, Report};

    #[test]
    fn test_render() {
        let orphan: Report<FileError> = report!(MaterializeError::Populate {
            spreadsheet_id: SpreadsheetId::new("abc")
        })
        .change_context(FileError::Materialize);

        let report = BatchReport {
            outcomes: vec![
                FileOutcome {
                    file_name: "a.csv".into(),
                    result: Ok(SpreadsheetId::new("id-1")),
                },
                FileOutcome {
                    file_name: "b.csv".into(),
                    result: Err(report!(FileError::Parse)),
                },
                FileOutcome {
                    file_name: "c.csv".into(),
                    result: Err(orphan),
                },
            ],
        };

        assert_eq!(
            render(&report),
            vec![
                "✅ a.csv → id-1".to_string(),
                "❌ b.csv: Failed to parse CSV".to_string(),
                "❌ c.csv: Failed to upload spreadsheet (spreadsheet abc left behind)".to_string(),
                "1 uploaded, 2 failed".to_string(),
            ]
        );
    }
}
