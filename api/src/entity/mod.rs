//! SeaORM entities
//!
//! Table definitions mirroring the database schema. The SQL adapters convert
//! these models into domain entities; nothing outside `adapters::sql` should
//! depend on them.

pub mod attendance;
pub mod users;
