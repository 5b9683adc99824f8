//! Domain layer for the employee directory service.
//!
//! Hosts the wire and document representations of an employee record, the
//! mapper between them, and the structural validation rules. Everything in
//! this crate is pure: no I/O, no storage access.

pub mod mapper;
pub mod types;
pub mod validate;
