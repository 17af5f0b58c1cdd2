//! cropweek-ingest: backlog import from spreadsheet exports (CSV).

pub mod types;
pub mod parsers;

pub use types::BacklogColumns;
pub use parsers::backlog_csv::{TaskNameNormalizer, parse_backlog_csv, parse_backlog_reader};
