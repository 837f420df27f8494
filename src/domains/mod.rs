//! Domains module containing business logic organized by bounded contexts.
//!
//! The calculator only exposes tools; each tool lives in
//! `tools/definitions/`.

pub mod tools;
