use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How the cells of a column are interpreted when sorting and range filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Date,
    Currency,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Date => write!(f, "date"),
            ColumnType::Currency => write!(f, "currency"),
        }
    }
}

fn default_sortable() -> bool {
    true
}

/// Column metadata, declared once for the lifetime of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    #[serde(default)]
    pub data_type: ColumnType,
    #[serde(default = "default_sortable")]
    pub sortable: bool,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: ColumnType::String,
            sortable: true,
        }
    }

    pub fn with_type(mut self, data_type: ColumnType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }
}

/// A row of rendered cell text.
///
/// `position` is the row's index in the table it was loaded into and is the
/// only identity a row has. Cell text is never modified after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    position: usize,
    values: Vec<String>,
}

impl DataRow {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All cell text of the row, space separated
    pub fn text(&self) -> String {
        self.values.join(" ")
    }
}

/// The immutable row set a table engine works over
#[derive(Debug, Clone)]
pub struct DataTable {
    pub name: String,
    columns: Vec<DataColumn>,
    rows: Vec<DataRow>,
    pub metadata: HashMap<String, String>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Build a table in one go from a schema and rows of cell text
    pub fn from_parts(
        name: impl Into<String>,
        columns: Vec<DataColumn>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let mut table = Self::new(name);
        for column in columns {
            table.add_column(column)?;
        }
        for row in rows {
            table.add_row(row)?;
        }
        Ok(table)
    }

    pub fn add_column(&mut self, column: DataColumn) -> Result<&mut Self> {
        if !self.rows.is_empty() {
            return Err(anyhow!(
                "Cannot add column '{}' after rows have been loaded",
                column.name
            ));
        }
        if self.columns.iter().any(|c| c.name == column.name) {
            return Err(anyhow!("Duplicate column name '{}'", column.name));
        }
        self.columns.push(column);
        Ok(self)
    }

    pub fn add_row(&mut self, values: Vec<String>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(anyhow!(
                "Row has {} values but table has {} columns",
                values.len(),
                self.columns.len()
            ));
        }
        let position = self.rows.len();
        self.rows.push(DataRow { position, values });
        Ok(())
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&DataColumn> {
        self.columns.get(index)
    }

    /// Exact name match first, then an ASCII case-insensitive one
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get_value(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rows_get_sequential_positions() {
        let mut table = DataTable::new("products");
        table.add_column(DataColumn::new("name")).unwrap();
        table.add_column(DataColumn::new("price")).unwrap();
        table.add_row(strings(&["Maize", "$4.00"])).unwrap();
        table.add_row(strings(&["Beans", "$2.50"])).unwrap();

        assert_eq!(table.row(0).unwrap().position(), 0);
        assert_eq!(table.row(1).unwrap().position(), 1);
        assert_eq!(table.get_value(1, 1), Some("$2.50"));
        assert_eq!(table.row(1).unwrap().text(), "Beans $2.50");
    }

    #[test]
    fn test_row_width_is_checked() {
        let mut table = DataTable::new("products");
        table.add_column(DataColumn::new("name")).unwrap();
        let err = table.add_row(strings(&["Maize", "extra"])).unwrap_err();
        assert!(err.to_string().contains("2 values"));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = DataTable::from_parts(
            "t",
            vec![DataColumn::new("name"), DataColumn::new("name")],
            vec![],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_column_lookup_falls_back_to_case_insensitive() {
        let table = DataTable::from_parts(
            "t",
            vec![DataColumn::new("Status"), DataColumn::new("status_code")],
            vec![],
        )
        .unwrap();
        assert_eq!(table.get_column_index("Status"), Some(0));
        assert_eq!(table.get_column_index("status"), Some(0));
        assert_eq!(table.get_column_index("missing"), None);
    }

    #[test]
    fn test_column_type_deserializes_lowercase() {
        let column: DataColumn =
            toml::from_str("name = \"amount\"\ndata_type = \"currency\"").unwrap();
        assert_eq!(column.data_type, ColumnType::Currency);
        assert!(column.sortable);
    }
}
