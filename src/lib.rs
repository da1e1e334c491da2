//! # Shipwreck API
//!
//! An HTTP service that answers plain-language questions about student
//! billing data. A hosted language model turns each question into one
//! read-only SQL query through a tool call; the service runs the query and
//! returns the rows, the SQL and the model's short answer.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── shipwreck-core/    # AppError, tracing span macros
//! ├── shipwreck-config/  # Environment configuration
//! ├── shipwreck-db/      # Read-only SQLite / PostgreSQL access, SQL guard, demo data
//! └── shipwreck-agent/   # Chat model client, rulebook prompt, SQL tools, agent loop
//! src/
//! ├── bin/cli.rs        # shipwreck-cli: ask, tables, seed-demo
//! ├── modules/
//! │   ├── root/        # GET /
//! │   └── query/       # POST /query
//! ├── logging.rs        # Request logging and subscriber setup
//! ├── metrics.rs        # Prometheus metrics
//! └── docs.rs           # OpenAPI document
//! ```
//!
//! Feature modules keep the usual layout: `controller.rs` for handlers,
//! `service.rs` for the work behind them, `model.rs` for DTOs and
//! `router.rs` for routes.
//!
//! ## Request flow
//!
//! ```text
//! POST /query {"query": "..."}
//!     → rulebook prompt + question sent to the model
//!     → model calls sql_db_query {"query": "SELECT ..."}
//!     → statement guarded and executed, rows fed back
//!     → model answers in one sentence
//!     → final statement re-executed in full
//! ← {"output": [...], "query": "SELECT ...", "content": "..."}
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! OPENAI_API_KEY=sk-...
//! DATABASE_URL=sqlite://data/student_data.sqlite
//! cargo run --bin shipwreck-cli -- seed-demo data/student_data.sqlite
//! cargo run --bin shipwreck
//! ```
//!
//! API documentation is served at `/swagger-ui` and `/scalar`.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

pub use shipwreck_agent;
pub use shipwreck_config;
pub use shipwreck_core;
pub use shipwreck_db;
