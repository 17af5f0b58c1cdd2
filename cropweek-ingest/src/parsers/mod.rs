pub mod backlog_csv;
