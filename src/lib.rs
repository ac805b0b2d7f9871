//! Payroll (nómina) engine for Guatemalan labor rules
//!
//! This crate computes per-employee payroll line items (gross, IGSS, ISR,
//! deductions and net pay) under date-scoped legal rule sets, aggregates them
//! into payroll runs, drives the run approval lifecycle and records an audit
//! trail of manual corrections. An axum router exposes the engine over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod storage;
