use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("could not get a connection from the pool: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("model {model} is embedded-only and has no table")]
    NoTable { model: &'static str },

    #[error("invalid annotation on {model}.{field}: {reason}")]
    InvalidAnnotation {
        model: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    #[error("embedding cycle: {}", chain.join(" -> "))]
    EmbedCycle { chain: Vec<&'static str> },

    #[error("cannot create table for {model}: {reason}")]
    InvalidTable { model: &'static str, reason: String },
}
