pub mod collect;
pub mod schema;
