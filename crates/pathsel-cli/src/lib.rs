//! # pathsel-cli — Command-Line Front End
//!
//! Provides the `pathsel` binary.
//!
//! ## Subcommands
//!
//! - `pathsel rules` — list the rules of the configured rule document.
//! - `pathsel select` — resolve a policy and print the selected path.
//! - `pathsel watch` — select, then follow changes to the candidate file.
//!
//! ```bash
//! pathsel select --rule fast --candidates paths.yml
//! pathsel select --preference latency,hops --sequence "1 * 2" -c paths.yml
//! pathsel watch -i --rules ./app.yml --app hello -c paths.yml
//! ```

pub mod candidates;
pub mod config;
pub mod rules;
pub mod select;
pub mod watch;
