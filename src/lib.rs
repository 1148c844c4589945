//! Parser and variable resolution engine for `.http` request scripts.
//!
//! A `.http` document holds one or more HTTP requests separated by `###`,
//! annotated with meta-directives in comments, and parameterized with
//! `{{placeholders}}`:
//!
//! ```http
//! @@base=https://api.example.com
//!
//! # @name login
//! # @status 200
//! POST {{base}}/login
//! Content-Type: application/json
//!
//! {"user": "{{$processEnv API_USER}}"}
//!
//! ###
//!
//! # @expect $.response.body.active true
//! GET {{base}}/me
//! Authorization: Bearer {{login.$.response.body.token}}
//! ```
//!
//! # Architecture
//!
//! - **parser**: turns document text into [`Document`] records in one forward
//!   pass, collecting variables (`@local`, `@@global`) and directives.
//! - **variables**: expands placeholders against local, global, and
//!   environment variables, built-in functions (`$datetime`, `$guid`,
//!   `$processEnv`, `$randomInt`), and outcomes of earlier named requests.
//! - **runner**: executes requests in order through a [`Transport`], registers
//!   outcomes for chaining, evaluates assertions, and redacts snapshots.
//! - **config**: runner settings.
//! - **models**: the data types shared by all of the above.
//!
//! # Usage
//!
//! ```
//! use http_script::{parse_document, ResolutionScope};
//! use http_script::models::OutcomeTable;
//! use std::collections::HashMap;
//!
//! let content = "\
//! @@domain=foo
//! @@port=3000
//! @@host={{domain}}:{{port}}
//!
//! @endpoint=https://{{host}}/bar
//! GET {{endpoint}}
//! ";
//!
//! let document = parse_document(content).unwrap();
//! let request = document.requests().next().unwrap();
//! assert_eq!(request.url, "{{endpoint}}");
//!
//! let env = HashMap::new();
//! let globals = document.global_variables();
//! let outcomes = OutcomeTable::new();
//! let scope = ResolutionScope::new(&env, &globals, &request.variables, &outcomes);
//! assert_eq!(scope.resolve(&request.url).unwrap(), "https://foo:3000/bar");
//! ```

pub mod config;
pub mod models;
pub mod parser;
pub mod runner;
pub mod variables;

pub use config::{load_config, RunnerConfig};
pub use models::{Document, Outcome, OutcomeTable, Request};
pub use parser::error::ParseError;
pub use parser::parse_document;
pub use runner::{run_document, RequestReport, RunError, Session, Transport, TransportError};
pub use variables::{resolve, ResolutionScope, VarError};
