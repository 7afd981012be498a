//! Database access for the setup pipeline
//!
//! - Object names the setup creates or inspects
//! - The `Connector` / `Session` seam used by every stage
//! - The PostgreSQL implementation over sqlx

mod pg;
mod session;

pub use pg::{quote_ident, PgConnector, PgSession};
pub use session::{Connector, Session};

/// Article records; created by the schema script.
pub const ARTICLES_TABLE: &str = "articulos";

/// Links between articles and uploaded documents; created by the schema script.
pub const ARTICLE_DOCUMENTS_TABLE: &str = "articulo_documentos";

/// Column metadata; the only table this crate writes.
pub const METADATA_TABLE: &str = "metadata_columnas";

pub const METADATA_SEQUENCE: &str = "metadata_columnas_id_seq";

/// Tables whose presence means the schema has been applied.
pub const REQUIRED_TABLES: [&str; 3] = [ARTICLES_TABLE, ARTICLE_DOCUMENTS_TABLE, METADATA_TABLE];
