//! Вывод результатов предсказания

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{AqiError, Result};
use crate::metrics::ErrorSummary;
use crate::types::PredictionResult;

const HEADERS: [&str; 5] = ["Date", "Predicted AQI", "Actual AQI", "Error", "Category"];

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Таблица с выравниванием по ширине колонок
pub fn render_table(results: &[PredictionResult]) -> String {
    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.date.to_string(),
                format!("{:.2}", r.predicted),
                optional(r.actual),
                optional(r.error),
                r.category.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&HEADERS, &widths));
    let rule = widths.map(|w| "-".repeat(w));
    let _ = writeln!(out, "{}", line(&rule.each_ref().map(String::as_str), &widths));
    for row in &rows {
        let _ = writeln!(out, "{}", line(&row.each_ref().map(String::as_str), &widths));
    }
    out
}

pub fn render_summary(summary: Option<&ErrorSummary>) -> String {
    match summary {
        Some(s) => format!(
            "Rows with actual AQI: {}  MAE: {:.3}  RMSE: {:.3}  Max error: {:.3}",
            s.count, s.mae, s.rmse, s.max_error
        ),
        None => "No actual AQI values: error metrics unavailable".to_string(),
    }
}

/// Экспорт в CSV с колонками Date, Predicted AQI, Actual AQI, Error, Category
pub fn write_csv(results: &[PredictionResult], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush().map_err(|e| AqiError::io(path, e))?;
    tracing::info!("Wrote {} predictions to {}", results.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn results() -> Vec<PredictionResult> {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        vec![
            PredictionResult::new(date, 42.0, Some(40.0)),
            PredictionResult::new(date.succ_opt().unwrap(), 180.5, None),
        ]
    }

    #[test]
    fn table_has_header_and_rows() {
        let table = render_table(&results());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Date"));
        assert!(lines[0].contains("Predicted AQI"));
        assert!(lines[2].contains("42.00"));
        assert!(lines[2].contains("2.00"));
        assert!(lines[2].ends_with("Good"));
        assert!(lines[3].contains("180.50"));
        assert!(lines[3].contains(" - "));
        assert!(lines[3].ends_with("Unhealthy"));
    }

    #[test]
    fn csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&results(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Predicted AQI,Actual AQI,Error,Category"));
        assert_eq!(lines.next(), Some("2024-02-01,42.0,40.0,2.0,Good"));
        assert_eq!(lines.next(), Some("2024-02-02,180.5,,,Unhealthy"));
    }

    #[test]
    fn summary_text() {
        assert!(render_summary(None).contains("unavailable"));
        let summary = ErrorSummary {
            count: 3,
            mae: 1.5,
            rmse: 2.0,
            max_error: 4.0,
        };
        assert!(render_summary(Some(&summary)).contains("MAE: 1.500"));
    }
}
