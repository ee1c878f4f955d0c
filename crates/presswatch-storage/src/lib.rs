// Postgres storage layer with sqlx
//
// `Database` wraps a PgPool and exposes one method per statement. Row
// structs are internal; conversions to the public DTOs live in models.rs.

pub mod models;
pub mod repositories;

pub use models::*;
pub use repositories::*;
