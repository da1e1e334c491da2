pub mod query;
pub mod root;

pub use self::query::model::{QueryRequest, QueryResponse};
