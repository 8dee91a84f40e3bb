//! ETL pipeline around the hh.ru vacancy API: scrape vacancies, extract
//! technology mentions, map them to FGOS and professional-standard
//! competencies, export timestamped CSVs, and load everything into a
//! PostgreSQL warehouse with OLAP views and a technology relationship
//! graph.

pub mod config;
pub mod db;
pub mod enrich;
pub mod error;
pub mod export;
pub mod hh;
pub mod telemetry;
