pub mod catalog;
pub mod error;
pub mod form;
pub mod models;
pub mod poll;
pub mod session;
pub mod settings;
pub mod store;
pub mod submit;
pub mod theme;
pub mod traits;

pub use catalog::{load_catalog, CatalogEntry};
pub use error::{HostError, HostResult, Result, ShowcaseError};
pub use form::{branch_name, parse_tags, slugify, ProjectForm, ToolForm};
pub use models::*;
pub use poll::{poll_until, PollPolicy};
pub use session::{AuthorizeRequest, OAuthApp, SessionManager, SessionStatus};
pub use settings::{Settings, SettingsPanel};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use submit::{
    ProjectReceipt, SkipReason, SkippedFile, SubmissionStep, Submitter, ToolReport,
    WorkflowOptions,
};
pub use theme::{ColorScheme, Palette, Theme, ThemeController};
pub use traits::{IdentityProvider, RepoHost, TokenExchange};
