pub mod client;
pub mod document;
pub mod error;
pub mod query;

pub use client::{Account, DocumentId, SessionToken, StoreClient};
pub use document::DocumentList;
pub use error::StoreError;
pub use query::Query;
