use anyhow::{Context, Result};
use github_backend::{BackendExchange, GitHubClient, WorkflowGistExchange};
use showcase_core::{
    ColorScheme, IdentityProvider, JsonFileStore, RepoHost, SessionManager, SessionStatus,
    SettingsPanel, ThemeController, TokenExchange,
};
use showcase_mock::{RecordingHost, StaticExchange};

use crate::cli::OutputFormat;
use crate::color::{self, Styler};
use crate::config::{self, Config, ExchangeKind};

/// Everything a command needs, built once per invocation
pub struct App {
    pub config: Config,
    pub format: OutputFormat,
    pub store: JsonFileStore,
    pub theme: ThemeController,
    github: GitHubClient,
    mock: Option<RecordingHost>,
}

impl App {
    pub fn new(config: Config, format: OutputFormat) -> Result<Self> {
        let store_path = config::store_path()?;
        tracing::debug!(path = %store_path.display(), "using session store");
        let store = JsonFileStore::new(store_path);

        let credential = SessionManager::new(&store).credential()?;
        let github = GitHubClient::with_base_url(
            &config.api_url,
            credential.as_ref().map(|c| c.expose()),
        );

        let mock = match showcase_mock::get_mock_dir() {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "mock mode enabled");
                Some(
                    showcase_mock::load_scenario(&dir)
                        .with_context(|| format!("Failed to load mock scenario {}", dir.display()))?,
                )
            }
            None => None,
        };

        let mut app = Self {
            config,
            format,
            store,
            theme: ThemeController::new(ColorScheme::Light),
            github,
            mock,
        };
        app.apply_saved_theme()?;
        // Only a `system` selection follows the terminal
        if app.theme.platform_changed(color::platform_scheme()) {
            tracing::debug!(
                dark = app.theme.palette().is_dark(),
                "palette follows terminal scheme"
            );
        }
        Ok(app)
    }

    pub fn session(&self) -> SessionManager<'_> {
        SessionManager::new(&self.store)
    }

    pub fn settings(&self) -> SettingsPanel<'_> {
        SettingsPanel::new(&self.store)
    }

    pub fn host(&self) -> &dyn RepoHost {
        match &self.mock {
            Some(mock) => mock,
            None => &self.github,
        }
    }

    pub fn identity_provider(&self) -> &dyn IdentityProvider {
        match &self.mock {
            Some(mock) => mock,
            None => &self.github,
        }
    }

    pub fn exchange(&self) -> Result<Box<dyn TokenExchange>> {
        if let Some(mock) = &self.mock {
            return Ok(Box::new(StaticExchange::new(&mock.accepted_token())));
        }

        match self.config.exchange {
            ExchangeKind::Workflow => Ok(Box::new(
                WorkflowGistExchange::new(&self.config.api_url, self.config.target())
                    .with_workflow(&self.config.workflow_file, &self.config.workflow_ref)
                    .with_policy(self.config.poll_policy()),
            )),
            ExchangeKind::Backend => {
                let url = self
                    .config
                    .backend_url
                    .as_deref()
                    .context("backend_url is not configured")?;
                Ok(Box::new(BackendExchange::new(url)))
            }
        }
    }

    pub fn styler(&self) -> Styler<'_> {
        Styler::new(self.theme.palette())
    }

    /// Re-check a stored token before it is used, when configured to.
    ///
    /// A rejected token is dropped so the caller sees a logged-out session.
    pub fn revalidate(&self) -> Result<()> {
        if !self.config.revalidate {
            return Ok(());
        }

        let status = self.session().validate(self.identity_provider())?;
        if status == SessionStatus::Rejected {
            eprintln!("Stored GitHub token was rejected; you have been logged out.");
        }
        Ok(())
    }

    /// The logged-in user's theme, or light when logged out
    fn apply_saved_theme(&mut self) -> Result<()> {
        let identity = self.session().identity()?;
        let theme = match identity {
            Some(identity) => self.settings().load(&identity)?.theme,
            None => Default::default(),
        };
        self.theme.apply(theme);
        Ok(())
    }
}
