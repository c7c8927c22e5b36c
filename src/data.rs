//! Tabular data: loading, inspection and feature encoding.

pub mod csv_io;
pub mod describe;
pub mod encode;
pub mod frame;

pub use encode::{design_matrix, Design};
pub use frame::{Cell, Column, ColumnType, DataFrame};
