use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::data::data_view::DataView;

/// Writes the filtered and sorted rows of a view to disk
pub struct DataExporter;

impl DataExporter {
    /// Export every row of the view, choosing the format from the extension.
    /// Returns the number of rows written.
    pub fn export_view<P: AsRef<Path>>(view: &DataView, path: P) -> Result<usize> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::export_view_to_csv(view, path),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::export_view_to_json(view, path),
            _ => Err(anyhow!(
                "Cannot export to {:?}: use a .csv or .json file name",
                path
            )),
        }
    }

    pub fn export_view_to_csv<P: AsRef<Path>>(view: &DataView, path: P) -> Result<usize> {
        let rows = view.rows();
        if rows.is_empty() {
            return Err(anyhow!("No data to export"));
        }

        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        writer.write_record(view.source().column_names())?;
        for row in &rows {
            writer.write_record(row.values())?;
        }
        writer.flush()?;

        info!(target: "export", "Exported {} rows to CSV {:?}", rows.len(), path);
        Ok(rows.len())
    }

    pub fn export_view_to_json<P: AsRef<Path>>(view: &DataView, path: P) -> Result<usize> {
        let rows = view.rows();
        if rows.is_empty() {
            return Err(anyhow!("No data to export"));
        }

        let headers = view.source().column_names();
        let records: Vec<Value> = rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = headers
                    .iter()
                    .cloned()
                    .zip(row.values().iter().map(|v| Value::String(v.clone())))
                    .collect();
                Value::Object(object)
            })
            .collect();

        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &records)?;

        info!(target: "export", "Exported {} rows to JSON {:?}", rows.len(), path);
        Ok(rows.len())
    }
}
