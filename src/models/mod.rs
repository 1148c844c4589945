//! Data models for parsed documents and executed requests.
//!
//! This module contains the structures shared by the parser, the variable
//! resolution engine, and the runner: requests and their blocks, declared
//! variables, meta-directives, and the outcomes of executed requests.

pub mod meta;
pub mod outcome;
pub mod request;
pub mod variable;

pub use meta::{Directive, DirectiveValue, Expectation, MetaEntry, MetaMap, StatusExpectation, Throws};
pub use outcome::{Outcome, OutcomeTable, ResolvedRequest, ResponseRecord};
pub use request::{Document, Header, HttpMethod, PartialRecord, Record, Request};
pub use variable::{Variable, VariableSet, VariableValue};
