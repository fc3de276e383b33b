//! Tabular export of the consolidated lot list.
//!
//! The table shape is fixed: `Section, Plan, Lot, Quote-part(s) Agrégée`,
//! then one `Propriétaire N - Nom` / `Propriétaire N - Adresse` column pair
//! per owner up to the largest owner count in the batch, with empty-string
//! padding for lots that have fewer. Export never mutates in-memory state
//! and can be retried freely.

use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use crate::error::PipelineError;
use crate::types::lot::ConsolidatedLot;

/// Worksheet name in the generated workbook.
const SHEET_NAME: &str = "Lots_Aggreges";

/// Cell value for an owner present on the lot but missing a name or address.
const MISSING_CELL: &str = "N/A";

/// A flat header + rows table, ready for any tabular writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    /// Column headers.
    pub headers: Vec<String>,

    /// One row per lot, each as wide as `headers`.
    pub rows: Vec<Vec<String>>,
}

/// Build the export table for the given lots.
pub fn build_export_table(lots: &[ConsolidatedLot]) -> ExportTable {
    let max_owners = lots.iter().map(|lot| lot.owners.len()).max().unwrap_or(0);

    let mut headers: Vec<String> = ["Section", "Plan", "Lot", "Quote-part(s) Agrégée"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    for n in 1..=max_owners {
        headers.push(format!("Propriétaire {n} - Nom"));
        headers.push(format!("Propriétaire {n} - Adresse"));
    }

    let rows = lots
        .iter()
        .map(|lot| {
            let mut row = vec![
                lot.section.clone(),
                lot.plan.clone(),
                lot.lot.clone(),
                lot.quote_part_display.clone(),
            ];
            for owner in &lot.owners {
                row.push(non_empty_or(&owner.name, MISSING_CELL));
                row.push(non_empty_or(&owner.address, MISSING_CELL));
            }
            for _ in lot.owners.len()..max_owners {
                row.push(String::new());
                row.push(String::new());
            }
            row
        })
        .collect();

    ExportTable { headers, rows }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// File name for an export generated on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("Analyse_Lots_Consolides_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Write the consolidated lots as an XLSX workbook at `path`.
pub fn write_xlsx(lots: &[ConsolidatedLot], path: impl AsRef<Path>) -> Result<(), PipelineError> {
    if lots.is_empty() {
        return Err(PipelineError::Export(
            "Aucune donnée à exporter. Veuillez d'abord effectuer l'analyse."
                .to_string()
                .into(),
        ));
    }

    let table = build_export_table(lots);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(export_error)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header.as_str())
            .map_err(export_error)?;
    }
    for (row_index, row) in table.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            worksheet
                .write_string(row_index as u32 + 1, col as u16, cell.as_str())
                .map_err(export_error)?;
        }
    }

    workbook.save(path).map_err(export_error)?;
    Ok(())
}

fn export_error(error: rust_xlsxwriter::XlsxError) -> PipelineError {
    PipelineError::Export(Box::new(error))
}

/// Render the export table as CSV text, for callers without xlsx needs.
pub fn to_csv(lots: &[ConsolidatedLot]) -> Result<String, PipelineError> {
    let table = build_export_table(lots);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| PipelineError::Export(Box::new(e)))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| PipelineError::Export(Box::new(e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PipelineError::Export(Box::new(e.into_error())))?;
    String::from_utf8(bytes).map_err(|e| PipelineError::Export(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::lot::Owner;

    fn lot(lot: &str, owners: Vec<Owner>) -> ConsolidatedLot {
        ConsolidatedLot {
            lot: lot.to_string(),
            section: "CN".to_string(),
            plan: "32".to_string(),
            owners,
            quote_parts: vec!["A".to_string()],
            quote_part_display: "A".to_string(),
            lot_key: lot.trim().to_uppercase(),
            owner_signature: String::new(),
        }
    }

    #[test]
    fn test_headers_padded_to_max_owner_count() {
        let lots = vec![
            lot("15", vec![Owner::new("Dupont Jean", "1 Rue X")]),
            lot(
                "16",
                vec![
                    Owner::new("Gallot/André", "9 Av M"),
                    Owner::new("Gallot/Michel", "9 Av M"),
                ],
            ),
        ];

        let table = build_export_table(&lots);
        assert_eq!(table.headers.len(), 4 + 2 * 2);
        assert_eq!(table.headers[4], "Propriétaire 1 - Nom");
        assert_eq!(table.headers[7], "Propriétaire 2 - Adresse");

        // The one-owner lot gets empty padding for the second pair.
        assert_eq!(table.rows[0].len(), table.headers.len());
        assert_eq!(table.rows[0][6], "");
        assert_eq!(table.rows[0][7], "");
    }

    #[test]
    fn test_owner_blank_fields_become_na() {
        let lots = vec![lot("15", vec![Owner::new("Martin", "")])];
        let table = build_export_table(&lots);
        assert_eq!(table.rows[0][4], "Martin");
        assert_eq!(table.rows[0][5], "N/A");
    }

    #[test]
    fn test_no_owners_yields_fixed_columns_only() {
        let lots = vec![lot("15", vec![])];
        let table = build_export_table(&lots);
        assert_eq!(
            table.headers,
            vec!["Section", "Plan", "Lot", "Quote-part(s) Agrégée"]
        );
        assert_eq!(table.rows[0], vec!["CN", "32", "15", "A"]);
    }

    #[test]
    fn test_export_filename_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(
            export_filename(date),
            "Analyse_Lots_Consolides_2026-08-07.xlsx"
        );
    }

    #[test]
    fn test_to_csv_renders_all_rows() {
        let lots = vec![lot("15", vec![Owner::new("Dupont Jean", "1 Rue X")])];
        let csv_text = to_csv(&lots).unwrap();
        let mut lines = csv_text.lines();
        assert!(lines.next().unwrap().starts_with("Section,Plan,Lot"));
        assert_eq!(lines.next().unwrap(), "CN,32,15,A,Dupont Jean,1 Rue X");
    }

    #[test]
    fn test_write_xlsx_empty_is_an_error() {
        let err = write_xlsx(&[], std::env::temp_dir().join("vide.xlsx")).unwrap_err();
        assert!(matches!(err, PipelineError::Export(_)));
    }

    #[test]
    fn test_write_xlsx_smoke() {
        let path = std::env::temp_dir().join("cadastre_test_export.xlsx");
        let lots = vec![lot("15", vec![Owner::new("Dupont Jean", "1 Rue X")])];
        write_xlsx(&lots, &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
        std::fs::remove_file(&path).ok();
    }
}
