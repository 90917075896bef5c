mod error;

pub use error::PostgresError;
