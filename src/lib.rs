//! Localized permalink rewrite rules for an events calendar: compiles the
//! rule catalogue, resolves request paths into query variables and builds
//! canonical links back out of them.

pub mod config;
pub mod error;
pub mod i18n;
pub mod rewrite;
pub mod taxonomy;
pub mod web_server;

// Public API
pub use config::Config;
pub use error::{RewriteError, RewriteResult};
pub use rewrite::{QueryVars, Rewriter, ViewLink};
pub use web_server::{HotReloader, WebServer};
