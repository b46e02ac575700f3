pub mod backend;
pub mod queries;
pub mod schema;
pub mod store_impl;

pub use backend::PgStore;
