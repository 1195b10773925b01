//! URL handling module for Wraith
//!
//! This module provides host extraction, subdomain matching, seed validation
//! and the per-session scope rule.

mod domain;
mod matcher;
mod scope;
mod seed;

// Re-export main functions
pub use domain::{extract_domain, strip_port};
pub use matcher::matches_subdomain;
pub use scope::ScopeRule;
pub use seed::Seed;
