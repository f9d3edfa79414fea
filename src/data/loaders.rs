use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::data::cell_parse::{infer_column_type, INFERENCE_SAMPLE_SIZE};
use crate::data::datatable::{DataColumn, DataTable};

/// Load a CSV file into a DataTable
///
/// The header row names the columns. Columns listed in `schema` take their
/// declared type and sortability; the rest are inferred from the data.
pub fn load_csv_to_datatable<P: AsRef<Path>>(
    path: P,
    table_name: &str,
    schema: &[DataColumn],
) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut string_rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Bad CSV record at row {}", line + 1))?;
        string_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    let mut table = build_table(table_name, &headers, string_rows, schema)?;
    table
        .metadata
        .insert("source_type".to_string(), "csv".to_string());
    table.metadata.insert(
        "source_path".to_string(),
        path.as_ref().display().to_string(),
    );

    info!(target: "loader", "Loaded {} rows from CSV {:?}", table.row_count(), path.as_ref());
    Ok(table)
}

/// Load a JSON array of flat objects into a DataTable
///
/// Column order follows the keys of the first object; keys first seen later
/// are appended. Missing keys become empty cells and non-string scalars are
/// rendered as text.
pub fn load_json_to_datatable<P: AsRef<Path>>(
    path: P,
    table_name: &str,
    schema: &[DataColumn],
) -> Result<DataTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let json: JsonValue = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))?;

    let records = json
        .as_array()
        .ok_or_else(|| anyhow!("Expected a JSON array of objects"))?;

    let mut headers: Vec<String> = Vec::new();
    for record in records {
        let object = record
            .as_object()
            .ok_or_else(|| anyhow!("Expected every JSON record to be an object"))?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let string_rows: Vec<Vec<String>> = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|object| {
            headers
                .iter()
                .map(|header| object.get(header).map(json_cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut table = build_table(table_name, &headers, string_rows, schema)?;
    table
        .metadata
        .insert("source_type".to_string(), "json".to_string());
    table.metadata.insert(
        "source_path".to_string(),
        path.as_ref().display().to_string(),
    );

    info!(target: "loader", "Loaded {} rows from JSON {:?}", table.row_count(), path.as_ref());
    Ok(table)
}

fn json_cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Pair headers with declared or inferred column descriptors and load the rows
fn build_table(
    table_name: &str,
    headers: &[String],
    rows: Vec<Vec<String>>,
    schema: &[DataColumn],
) -> Result<DataTable> {
    let mut table = DataTable::new(table_name);

    for (col_idx, header) in headers.iter().enumerate() {
        let declared = schema
            .iter()
            .find(|c| c.name == *header || c.name.eq_ignore_ascii_case(header));

        let column = match declared {
            Some(declared) => DataColumn {
                name: header.clone(),
                ..declared.clone()
            },
            None => {
                let samples = rows
                    .iter()
                    .take(INFERENCE_SAMPLE_SIZE)
                    .filter_map(|row| row.get(col_idx).map(String::as_str));
                DataColumn::new(header.clone()).with_type(infer_column_type(samples))
            }
        };

        debug!(
            target: "loader",
            "Column '{}': {} ({})",
            column.name,
            column.data_type,
            if declared.is_some() { "declared" } else { "inferred" }
        );
        table.add_column(column)?;
    }

    for (line, row) in rows.into_iter().enumerate() {
        table
            .add_row(row)
            .with_context(|| format!("Row {} does not match the header", line + 1))?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::ColumnType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_with_inferred_and_declared_types() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "product,price,listed,sku").unwrap();
        writeln!(file, "Maize,\"$1,200.00\",2024-01-02,100").unwrap();
        writeln!(file, "Beans,$80.00,2024-02-03,200").unwrap();

        let schema = vec![DataColumn::new("sku").with_sortable(false)];
        let table = load_csv_to_datatable(file.path(), "products", &schema).unwrap();

        let types: Vec<ColumnType> = table.columns().iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::String,
                ColumnType::Currency,
                ColumnType::Date,
                ColumnType::String
            ]
        );
        assert!(!table.columns()[3].sortable);
        assert_eq!(table.get_value(0, 1), Some("$1,200.00"));
        assert_eq!(table.metadata.get("source_type").map(String::as_str), Some("csv"));
    }

    #[test]
    fn test_json_keeps_key_order_and_fills_gaps() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name":"Amy","amount":5,"kyc":true}},{{"name":"Bob","note":"late"}}]"#
        )
        .unwrap();

        let table = load_json_to_datatable(file.path(), "payouts", &[]).unwrap();
        assert_eq!(table.column_names(), vec!["name", "amount", "kyc", "note"]);
        assert_eq!(table.get_value(0, 2), Some("true"));
        assert_eq!(table.get_value(1, 1), Some(""));
        assert_eq!(table.get_value(1, 3), Some("late"));
    }

    #[test]
    fn test_json_must_be_array_of_objects() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"Amy"}}"#).unwrap();
        assert!(load_json_to_datatable(file.path(), "t", &[]).is_err());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(load_json_to_datatable(file.path(), "t", &[]).is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_csv_to_datatable("/nonexistent/products.csv", "t", &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
