//! SQL tools the model may call.

use serde::Deserialize;
use serde_json::{Value, json};
use shipwreck_db::{Database, JsonRow};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{ToolCall, ToolDefinition};

pub const QUERY_TOOL: &str = "sql_db_query";
/// Accepted in place of [`QUERY_TOOL`]; models sometimes swap the words.
pub const QUERY_TOOL_ALIAS: &str = "query_sql_db";
pub const LIST_TABLES_TOOL: &str = "sql_db_list_tables";
pub const SCHEMA_TOOL: &str = "sql_db_schema";

#[derive(Debug, Error, PartialEq)]
pub enum ToolCallError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("malformed arguments for {tool}: {reason}")]
    MalformedArguments { tool: String, reason: String },
}

/// A tool call with its arguments decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    Query { query: String },
    ListTables,
    Schema { tables: Vec<String> },
}

impl ToolInvocation {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Query { .. } => QUERY_TOOL,
            Self::ListTables => LIST_TABLES_TOOL,
            Self::Schema { .. } => SCHEMA_TOOL,
        }
    }

    /// Arguments as recorded in an agent step.
    pub fn input(&self) -> Value {
        match self {
            Self::Query { query } => json!({ "query": query }),
            Self::ListTables => json!({}),
            Self::Schema { tables } => json!({ "table_names": tables.join(", ") }),
        }
    }
}

/// Result of running one tool, as text for the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolObservation {
    pub text: String,
    /// Normalized SQL, set only when a query ran without error.
    pub executed_sql: Option<String>,
}

impl ToolObservation {
    fn error(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("Error: {message}"),
            executed_sql: None,
        }
    }
}

/// Tool definitions offered to the model.
pub fn definitions(schema_tools: bool) -> Vec<ToolDefinition> {
    let mut tools = vec![ToolDefinition::function(
        QUERY_TOOL,
        "Execute a single read-only SQL SELECT statement against the database \
         and return the resulting rows as JSON. If the statement is not correct, \
         an error message is returned; rewrite the query and try again.",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "A detailed and correct SQL query."
                }
            },
            "required": ["query"]
        }),
    )];

    if schema_tools {
        tools.push(ToolDefinition::function(
            LIST_TABLES_TOOL,
            "List the tables and views in the database.",
            json!({ "type": "object", "properties": {} }),
        ));
        tools.push(ToolDefinition::function(
            SCHEMA_TOOL,
            "Show the columns of the given tables. Input is a comma-separated \
             list of table names, for example: Charge, Term",
            json!({
                "type": "object",
                "properties": {
                    "table_names": {
                        "type": "string",
                        "description": "Comma-separated list of table names."
                    }
                },
                "required": ["table_names"]
            }),
        ));
    }

    tools
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

#[derive(Deserialize)]
struct SchemaArgs {
    table_names: String,
}

/// Decode a tool call into an invocation.
///
/// The query tool also accepts a bare JSON string as its argument, since
/// models occasionally send the SQL without the wrapping object.
pub fn parse_call(call: &ToolCall, schema_tools: bool) -> Result<ToolInvocation, ToolCallError> {
    let name = call.function.name.trim();
    let raw = call.function.arguments.trim();
    let malformed = |reason: String| ToolCallError::MalformedArguments {
        tool: name.to_string(),
        reason,
    };

    match name {
        QUERY_TOOL | QUERY_TOOL_ALIAS => {
            let query = match serde_json::from_str::<QueryArgs>(raw) {
                Ok(args) => args.query,
                Err(e) => match serde_json::from_str::<String>(raw) {
                    Ok(query) => query,
                    Err(_) => return Err(malformed(e.to_string())),
                },
            };
            if query.trim().is_empty() {
                return Err(malformed("query is empty".to_string()));
            }
            Ok(ToolInvocation::Query { query })
        }
        LIST_TABLES_TOOL if schema_tools => Ok(ToolInvocation::ListTables),
        SCHEMA_TOOL if schema_tools => {
            let args: SchemaArgs =
                serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;
            let tables: Vec<String> = args
                .table_names
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if tables.is_empty() {
                return Err(malformed("table_names is empty".to_string()));
            }
            Ok(ToolInvocation::Schema { tables })
        }
        other => Err(ToolCallError::UnknownTool(other.to_string())),
    }
}

/// Runs decoded tool calls against the database.
#[derive(Debug, Clone)]
pub struct SqlToolbox {
    db: Database,
    top_k: usize,
    schema_tools: bool,
}

impl SqlToolbox {
    pub fn new(db: Database, top_k: usize, schema_tools: bool) -> Self {
        Self {
            db,
            top_k: top_k.max(1),
            schema_tools,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn schema_tools(&self) -> bool {
        self.schema_tools
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        definitions(self.schema_tools)
    }

    pub async fn run(&self, invocation: &ToolInvocation) -> ToolObservation {
        match invocation {
            ToolInvocation::Query { query } => self.run_query(query).await,
            ToolInvocation::ListTables => match self.db.list_tables().await {
                Ok(tables) => ToolObservation {
                    text: tables.join(", "),
                    executed_sql: None,
                },
                Err(e) => ToolObservation::error(e),
            },
            ToolInvocation::Schema { tables } => match self.db.describe_tables(tables).await {
                Ok(infos) => ToolObservation {
                    text: infos
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n"),
                    executed_sql: None,
                },
                Err(e) => ToolObservation::error(e),
            },
        }
    }

    async fn run_query(&self, query: &str) -> ToolObservation {
        let sql = match shipwreck_db::normalize_select(query) {
            Ok(sql) => sql,
            Err(e) => {
                warn!(error = %e, "Rejected generated SQL");
                return ToolObservation::error(e);
            }
        };

        // One extra row tells us whether the result was cut.
        let limit = Some(self.top_k.saturating_add(1));
        let rows = match self.db.fetch_rows_limited(&sql, limit).await {
            Ok(rows) => rows,
            Err(e) => {
                debug!(error = %e, "Generated SQL failed");
                return ToolObservation::error(e);
            }
        };

        ToolObservation {
            text: render_rows(rows, self.top_k),
            executed_sql: Some(sql),
        }
    }
}

fn render_rows(mut rows: Vec<JsonRow>, top_k: usize) -> String {
    let truncated = rows.len() > top_k;
    rows.truncate(top_k);

    let shown = rows.len();
    let array = Value::Array(rows.into_iter().map(Value::Object).collect());
    let mut text = array.to_string();
    if truncated {
        text.push_str(&format!(
            "\n(showing the first {shown} rows; more rows were returned)"
        ));
    }
    text
}
