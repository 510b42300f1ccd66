//! Recording repository host for showcase testing
//!
//! [`RecordingHost`] implements `RepoHost` and `IdentityProvider` against
//! in-memory state instead of the GitHub API. It is used by the workflow tests
//! and by the CLI when `SHOWCASE_MOCK_DIR` points at a scenario directory:
//!
//! ```text
//! scenarios/tool-submission/
//! ├── fixture.toml       # Seed state and injected failures
//! └── call_log.jsonl     # Runtime log (written by RecordingHost)
//! ```

mod fixture;
mod host;

pub use fixture::{FailureRule, FixtureError, FixtureFile, FixtureUser, HostFixture};
pub use host::{CallLogEntry, RecordingHost, StaticExchange};

/// Environment variable to enable mock mode
pub const MOCK_DIR_ENV: &str = "SHOWCASE_MOCK_DIR";

/// Get the mock directory from environment, if set
pub fn get_mock_dir() -> Option<std::path::PathBuf> {
    std::env::var_os(MOCK_DIR_ENV).map(std::path::PathBuf::from)
}

/// Load the scenario in `dir`, logging calls to its `call_log.jsonl`
pub fn load_scenario(dir: &std::path::Path) -> Result<RecordingHost, FixtureError> {
    let fixture_path = dir.join("fixture.toml");
    let fixture = if fixture_path.exists() {
        HostFixture::load(&fixture_path)?
    } else {
        HostFixture::default()
    };
    Ok(RecordingHost::new(fixture).with_call_log(&dir.join("call_log.jsonl")))
}
