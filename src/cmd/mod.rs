//! CLI command implementations.
//!
//! | Module      | Commands handled |
//! |-------------|------------------|
//! | `run`       | `Run`            |
//! | `summarize` | `Summarize`      |
//! | `config`    | `Config`         |

pub mod config;
pub mod run;
pub mod summarize;

pub use config::cmd_config;
pub use run::cmd_run;
pub use summarize::cmd_summarize;
