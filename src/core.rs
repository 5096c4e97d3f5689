//! Pure pipeline stages: no I/O beyond loading the catalog.

pub mod catalog;
pub mod dashboard;
pub mod profile;
pub mod series;
