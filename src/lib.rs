//! covercanon - evidence-backed coverage decisions for insurance comparison
//!
//! Extracted proposal rows are classified into a coverage universe, names
//! are recalled against a governed alias table, policy evidence decides
//! canonical codes, and a fixed rule order resolves whether insurers can be
//! compared.

pub mod alias;
pub mod catalog;
pub mod cli;
pub mod comparison;
pub mod decision;
pub mod evidence;
pub mod explain;
pub mod observability;
pub mod pipeline;
pub mod universe;
