use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Columns of one table or view as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl fmt::Display for TableInfo {
    /// Renders `Name(col TYPE, col TYPE NOT NULL, ...)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let ty = if c.data_type.is_empty() {
                    "ANY"
                } else {
                    c.data_type.as_str()
                };
                if c.nullable {
                    format!("{} {}", c.name, ty)
                } else {
                    format!("{} {} NOT NULL", c.name, ty)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.name, columns)
    }
}
