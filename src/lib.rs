//! Leave Request Validation and Balance Accounting Engine
//!
//! This crate decides whether an employee's leave request is admissible and
//! keeps allocation balances consistent with approved leave. A request is
//! checked against the employee's work shift and the holiday calendar,
//! against their existing requested or approved leave, against the leave
//! type of the adjacent working days, and against the remaining balance of
//! the allocation period that covers it.
//!
//! - [`services`] holds the validation pipeline, the counter maintenance and
//!   the request workflow
//! - [`store`] is the persistence boundary
//! - [`access`] is the explicit actor context used for record ownership
//! - [`config`] loads leave types, work shifts and holidays from YAML

#![warn(missing_docs)]

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod submission;
