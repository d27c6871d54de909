// exactmatch/src/lib.rs
//! # exactmatch CLI Application
//!
//! This crate provides the command-line interface for the `exactmatch-core`
//! extraction engine: reading rule files, writing histograms and records, and
//! printing the run summary.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod output;
