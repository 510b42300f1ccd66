pub mod contents;
pub mod gist;
pub mod git;
pub mod issue;
pub mod pull;
pub mod repo;
pub mod user;

pub use contents::*;
pub use gist::*;
pub use git::*;
pub use issue::*;
pub use pull::*;
pub use repo::*;
pub use user::*;
