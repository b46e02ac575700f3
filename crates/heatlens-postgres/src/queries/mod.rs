pub mod clicks;
pub mod pages;
pub mod search;
pub mod selectors;
pub mod sessions;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// Owned bind value for dynamically assembled queries.
#[derive(Debug, Clone)]
pub(crate) enum QueryParam {
    Int(i64),
    Text(String),
    TextArray(Vec<String>),
}

/// Bind `params` onto `query` in order.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Int(v) => query.bind(*v),
            QueryParam::Text(v) => query.bind(v.clone()),
            QueryParam::TextArray(v) => query.bind(v.clone()),
        };
    }
    query
}
