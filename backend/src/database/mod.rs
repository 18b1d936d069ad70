//! Postgres connection pool and schema bootstrap.

mod pool;
pub mod schema;

pub use pool::{create_pool, Database, DatabaseError};
pub use schema::ensure_schema;
