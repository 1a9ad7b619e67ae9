//! # CLI Module
//!
//! Command-line tooling for declarative rule files.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load a rule file and validate it; exits non-zero with the first violation:
//!
//! ```bash
//! crudrules check rules/pet.yaml
//! ```
//!
//! ### `project`
//!
//! Run a JSON document through the inbound or outbound projector and print the
//! result as JSON. The document is read from `--input`, or stdin when omitted:
//!
//! ```bash
//! crudrules project rules/pet.yaml --version 2 --direction inbound --input pet.json
//! echo '{"name":"rex"}' | crudrules project rules/pet.yaml --direction outbound
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, ProjectDirection};
