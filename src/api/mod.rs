//! API handlers for LabLoan REST endpoints
//!
//! Authentication and role/lab scoping happen in an external collaborator
//! in front of this API; handlers here only run the lifecycle.

pub mod equipment;
pub mod health;
pub mod history;
pub mod openapi;
pub mod requests;
