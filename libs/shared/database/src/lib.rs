pub mod error;
pub mod postgrest;

pub use error::DbError;
pub use postgrest::PostgrestClient;
