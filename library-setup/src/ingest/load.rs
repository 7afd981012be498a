//! Reset-then-bulk-insert load of the column metadata table

use super::parse::ParsedTable;
use super::record::RowOutcome;
use crate::db::{Session, METADATA_SEQUENCE, METADATA_TABLE};
use crate::error::Result;
use tracing::{debug, info, warn};

/// Counts from one `reload`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub inserted: usize,
    /// Rows without ordinal or name.
    pub skipped: usize,
    /// Valid rows the database rejected.
    pub failed: usize,
}

impl LoadReport {
    pub fn errors(&self) -> usize {
        self.skipped + self.failed
    }
}

/// Replace the metadata table contents with the rows of `table`.
///
/// The reset and every insert run on the same session. Only the reset can
/// fail the load; a bad row is logged and counted.
pub async fn reload<S: Session>(session: &mut S, table: &ParsedTable) -> Result<LoadReport> {
    session.reset_table(METADATA_TABLE, METADATA_SEQUENCE).await?;
    info!(table = METADATA_TABLE, "Metadata table reset");

    let mut report = LoadReport::default();
    for row in &table.rows {
        match row.classify() {
            RowOutcome::Valid(record) => match session.insert_column(&record).await {
                Ok(()) => {
                    report.inserted += 1;
                    debug!(
                        line = row.line,
                        ordinal = record.ordinal,
                        name = %record.name,
                        "Inserted column metadata"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(line = row.line, ordinal = record.ordinal, error = %e, "Row rejected");
                }
            },
            RowOutcome::Skip(reason) => {
                report.skipped += 1;
                warn!(line = row.line, %reason, "Skipping table row");
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed = report.failed,
        "Metadata load finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Connector;
    use crate::ingest::parse_table_str;
    use crate::testing::{FakeConnector, FakeServer};

    fn source(rows: &[&str]) -> String {
        let mut text = String::from("|nro_columna|columna|explicacion|formato|dato_fijo|idioma|backup|\n|-|-|-|-|-|-|-|\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_reload_replaces_existing_rows_and_restarts_ids() {
        let server = FakeServer::with_schema("mylib");
        server.seed_metadata(&["old one", "old two", "old three"]);
        let connector = FakeConnector::new(server.clone());
        let table = parse_table_str(&source(&[
            "|5|Autor||||||",
            "|6|Titulo||||||",
        ]))
        .unwrap();

        let mut session = connector.open_target(&server.settings()).await.unwrap();
        let report = reload(&mut session, &table).await.unwrap();

        assert_eq!(report.inserted, 2);
        let rows = server.metadata_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].record.ordinal, 5);
        assert_eq!(rows[1].id, 2);
    }

    #[tokio::test]
    async fn test_reload_twice_gives_same_contents() {
        let server = FakeServer::with_schema("mylib");
        let connector = FakeConnector::new(server.clone());
        let table = parse_table_str(&source(&["|1|Autor||||||", "|2|Titulo||||||"])).unwrap();

        let mut session = connector.open_target(&server.settings()).await.unwrap();
        reload(&mut session, &table).await.unwrap();
        let first = server.metadata_rows();
        reload(&mut session, &table).await.unwrap();

        assert_eq!(server.metadata_rows(), first);
    }

    #[tokio::test]
    async fn test_row_without_name_is_skipped_not_fatal() {
        let server = FakeServer::with_schema("mylib");
        let connector = FakeConnector::new(server.clone());
        let table = parse_table_str(&source(&[
            "|1|Autor||||||",
            "|2|Titulo||||||",
            "|3|||||||",
            "|4|Anio||||||",
            "|5|DOI||||||",
        ]))
        .unwrap();

        let mut session = connector.open_target(&server.settings()).await.unwrap();
        let report = reload(&mut session, &table).await.unwrap();

        assert_eq!(report.inserted, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(server.metadata_rows().len(), 4);
    }

    #[tokio::test]
    async fn test_single_valid_row_of_two() {
        let server = FakeServer::with_schema("mylib");
        let connector = FakeConnector::new(server.clone());
        let table = parse_table_str(&source(&["|1|Autor||||||", "|2|||||||"])).unwrap();

        let mut session = connector.open_target(&server.settings()).await.unwrap();
        let report = reload(&mut session, &table).await.unwrap();

        assert_eq!(
            report,
            LoadReport {
                inserted: 1,
                skipped: 1,
                failed: 0,
            }
        );
        let rows = server.metadata_rows();
        assert_eq!(rows[0].record.ordinal, 1);
        assert_eq!(rows[0].record.max_length, None);
    }

    #[tokio::test]
    async fn test_rejected_insert_is_counted_and_load_continues() {
        let server = FakeServer::with_schema("mylib");
        server.reject_insert_of("Titulo");
        let connector = FakeConnector::new(server.clone());
        let table =
            parse_table_str(&source(&["|1|Autor||||||", "|2|Titulo||||||", "|3|DOI||||||"]))
                .unwrap();

        let mut session = connector.open_target(&server.settings()).await.unwrap();
        let report = reload(&mut session, &table).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors(), 1);
    }
}
