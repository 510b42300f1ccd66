pub mod client;
mod convert;
pub mod error;
pub mod models;
pub mod oauth;
mod trait_impl;


pub use client::{GitHubClient, GITHUB_API_URL};
pub use error::{GitHubError, Result};
pub use models::*;
pub use oauth::{BackendExchange, WorkflowGistExchange};

// Re-export showcase-core types for convenience
pub use showcase_core::{HostError, IdentityProvider, RepoHost, TokenExchange};
