// src/lib.rs

pub mod boundary;
pub mod config;
pub mod error;
pub mod field;
pub mod multigrid;
pub mod visualisation;
