mod cache;
mod parser;
mod schema;
pub mod table;

use cache::{DatasetCache, SourceKey};
use schema::ColumnSpec;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use table::Table;

/// Which of the two dashboard datasets a source feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Bookings,
    Sessions,
}

impl DatasetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bookings => "bookings",
            Self::Sessions => "sessions",
        }
    }

    pub(crate) fn columns(self) -> &'static [ColumnSpec] {
        match self {
            Self::Bookings => schema::BOOKING_COLUMNS,
            Self::Sessions => schema::SESSION_COLUMNS,
        }
    }

    pub(crate) fn spec_for_header(self, header: &str) -> Option<&'static ColumnSpec> {
        match self {
            Self::Bookings => schema::booking_spec_for_header(header),
            Self::Sessions => schema::session_spec_for_header(header),
        }
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Unavailable(std::io::Error),
    Csv(csv::Error),
    SchemaMismatch {
        dataset: DatasetKind,
        column: &'static str,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Unavailable(err) => write!(f, "failed to open dataset source: {}", err),
            DatasetError::Csv(err) => write!(f, "invalid delimited data: {}", err),
            DatasetError::SchemaMismatch { dataset, column } => write!(
                f,
                "{} dataset is missing required column '{}' after normalization",
                dataset.label(),
                column
            ),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Unavailable(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
            DatasetError::SchemaMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A dataset input: a file on disk or an uploaded byte payload.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

impl DatasetSource {
    pub fn path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::new(bytes.into()))
    }

    fn key(&self, dataset: DatasetKind) -> SourceKey {
        match self {
            Self::Path(path) => SourceKey::for_path(dataset, path.clone()),
            Self::Bytes(bytes) => SourceKey::for_bytes(dataset, bytes),
        }
    }
}

/// Loads and memoizes the two dashboard tables. One loader lives for the
/// process; repeated loads of an unchanged source return the cached table.
#[derive(Default)]
pub struct DatasetLoader {
    cache: DatasetCache,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(
        &self,
        bookings: &DatasetSource,
        sessions: &DatasetSource,
    ) -> Result<(Arc<Table>, Arc<Table>), DatasetError> {
        let bookings = self.load_one(DatasetKind::Bookings, bookings)?;
        let sessions = self.load_one(DatasetKind::Sessions, sessions)?;
        Ok((bookings, sessions))
    }

    pub fn load_one(
        &self,
        kind: DatasetKind,
        source: &DatasetSource,
    ) -> Result<Arc<Table>, DatasetError> {
        let key = source.key(kind);
        let source = source.clone();
        self.cache.get_or_parse(key, move || match source {
            DatasetSource::Path(path) => {
                let file = std::fs::File::open(&path)?;
                parser::parse_table(file, kind)
            }
            DatasetSource::Bytes(bytes) => parser::parse_table(bytes.as_slice(), kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSIONS_CSV: &str = "\
session_id,search_id,device_type_used,search_time
s1,q1,mobile,2024-07-01 08:00:00
s2,q2,desktop,2024-07-01 09:15:00
s3,q3,mobile,2024-07-02 10:40:00
";

    #[test]
    fn loads_byte_sources_and_reuses_the_cache() {
        let loader = DatasetLoader::new();
        let source = DatasetSource::bytes(SESSIONS_CSV);

        let first = loader
            .load_one(DatasetKind::Sessions, &source)
            .expect("sessions load");
        let second = loader
            .load_one(DatasetKind::Sessions, &source)
            .expect("sessions cache hit");

        assert_eq!(first.len(), 3);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let loader = DatasetLoader::new();
        let source = DatasetSource::path("./does-not-exist.csv");

        let err = loader
            .load_one(DatasetKind::Bookings, &source)
            .expect_err("expected io error");
        match err {
            DatasetError::Unavailable(_) => {}
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn load_returns_both_tables() {
        let bookings_csv = "\
booking_id,customer_id,to_city,to_country,service_name,device_type_used,INR_Amount,distance_km,days_to_departure,booking_time
b1,c1,Delhi,India,GoFlight,mobile,1200,750,12,2024-07-01 09:30:00
";
        let loader = DatasetLoader::new();
        let (bookings, sessions) = loader
            .load(
                &DatasetSource::bytes(bookings_csv),
                &DatasetSource::bytes(SESSIONS_CSV),
            )
            .expect("both datasets load");

        assert_eq!(bookings.len(), 1);
        assert_eq!(sessions.len(), 3);
        assert!(bookings.column("destination_city").is_some());
    }
}
