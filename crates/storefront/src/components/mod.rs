//! Reusable view components.

pub mod data_table;

pub use data_table::{DataTableConfig, GridParams, GridRow, GridView, TableColumn};
