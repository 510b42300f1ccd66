use crate::cli::OutputFormat;
use crate::color::Styler;
use colored::Colorize;
use serde::Serialize;
use showcase_core::{
    AuthorizeRequest, CatalogEntry, Identity, Palette, ProjectReceipt, SessionStatus,
    Settings, ToolReport,
};

pub fn output_result<T: Serialize + Displayable>(result: &T, format: OutputFormat, style: &Styler) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            println!("{}", result.display(style));
        }
    }
}

pub fn output_list<T: Serialize + Displayable>(items: &[T], format: OutputFormat, style: &Styler) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", item.display(style));
                println!();
            }
        }
    }
}

/// One-line confirmation, `{"success": true, "message": ..}` in JSON mode
pub fn output_message(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "success": true, "message": message });
            println!("{}", json);
        }
        OutputFormat::Text => println!("{}", message),
    }
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let json_err = JsonError {
                error: true,
                code: error_code(err).to_string(),
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err)
                .unwrap_or_else(|_| format!(r#"{{"error": true, "message": "{}"}}"#, err))
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

fn error_code(err: &anyhow::Error) -> &'static str {
    use showcase_core::ShowcaseError;

    match err.downcast_ref::<ShowcaseError>() {
        Some(ShowcaseError::NotAuthenticated) => "not_authenticated",
        Some(ShowcaseError::Authentication(_)) => "authentication_failed",
        Some(ShowcaseError::TokenPollExhausted { .. }) => "token_poll_exhausted",
        Some(ShowcaseError::InvalidInput(_)) => "invalid_input",
        Some(ShowcaseError::StepFailed { .. }) => "step_failed",
        _ => "error",
    }
}

pub trait Displayable {
    fn display(&self, style: &Styler) -> String;
}

/// `auth status` result
#[derive(Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    pub user: Option<Identity>,
}

impl Displayable for SessionView {
    fn display(&self, style: &Styler) -> String {
        match (&self.status, &self.user) {
            (SessionStatus::Valid, Some(user)) | (SessionStatus::Unreachable, Some(user)) => {
                let mut output = format!(
                    "Logged in as {} (@{})",
                    style.heading(user.display_name()),
                    user.login.cyan()
                );
                if self.status == SessionStatus::Unreachable {
                    output.push_str(&format!(
                        "\n  {}",
                        "GitHub could not be reached; the token was not re-checked".yellow()
                    ));
                }
                output
            }
            (SessionStatus::Rejected, _) => format!(
                "{}\nRun 'showcase auth login' to sign in again.",
                "Stored token was rejected by GitHub and has been removed.".yellow()
            ),
            _ => "Not logged in. Run 'showcase auth login' to sign in.".to_string(),
        }
    }
}

impl Displayable for Identity {
    fn display(&self, style: &Styler) -> String {
        format!(
            "{} {} (@{})\n  {}: {}",
            "Logged in as".green(),
            style.heading(self.display_name()),
            self.login.cyan(),
            style.label("Id"),
            self.id
        )
    }
}

impl Displayable for AuthorizeRequest {
    fn display(&self, style: &Styler) -> String {
        format!(
            "Open this URL to authorize the app:\n\n  {}\n\n{}",
            self.url.cyan().underline(),
            style.label(
                "Then run 'showcase auth callback --url <redirect URL>' with the page GitHub sends you to."
            )
        )
    }
}

impl Displayable for CatalogEntry {
    fn display(&self, style: &Styler) -> String {
        let mut output = format!("{}\n  {}", style.heading(&self.name), self.url.cyan());

        if !self.description.is_empty() {
            output.push_str(&format!("\n  {}", style.value(&self.description)));
        }

        if !self.tags.is_empty() {
            let tags: Vec<String> = self.tags.iter().map(|t| t.magenta().to_string()).collect();
            output.push_str(&format!("\n  {}: {}", style.label("Tags"), tags.join(", ")));
        }

        match (&self.user, self.timestamp) {
            (Some(user), Some(at)) => output.push_str(&format!(
                "\n  {}: @{} on {}",
                style.label("Submitted by"),
                user,
                at.format("%Y-%m-%d")
            )),
            (Some(user), None) => {
                output.push_str(&format!("\n  {}: @{}", style.label("Submitted by"), user))
            }
            _ => {}
        }
        output
    }
}

impl Displayable for ProjectReceipt {
    fn display(&self, style: &Styler) -> String {
        format!(
            "{} {}\n  {}: #{} {}",
            "Submitted".green().bold(),
            style.heading(&self.submission.name),
            style.label("Issue"),
            self.issue.number,
            self.issue.html_url.cyan()
        )
    }
}

impl Displayable for ToolReport {
    fn display(&self, style: &Styler) -> String {
        let fork_note = if self.fork_created {
            "created"
        } else {
            "existing"
        };

        let mut output = format!(
            "{} {}\n  {}: #{} {}\n  {}: {} ({})\n  {}: {} -> {}",
            "Submitted".green().bold(),
            style.heading(&self.submission.name),
            style.label("Pull request"),
            self.pull_request.number,
            self.pull_request.html_url.cyan(),
            style.label("Fork"),
            self.fork.id,
            fork_note,
            style.label("Branch"),
            self.branch,
            self.base_branch
        );

        output.push_str(&format!("\n  {}:", style.label("Files")));
        for path in &self.written {
            output.push_str(&format!("\n    {}", path));
        }

        if !self.skipped.is_empty() {
            output.push_str(&format!("\n  {}:", "Skipped".yellow()));
            for file in &self.skipped {
                output.push_str(&format!(
                    "\n    {} ({} bytes, {})",
                    file.name, file.size, file.reason
                ));
            }
        }

        output
    }
}

/// `settings show` result
#[derive(Serialize)]
pub struct SettingsView {
    pub login: String,
    #[serde(flatten)]
    pub settings: Settings,
    pub dark: bool,
    pub palette: Vec<(String, String)>,
}

impl SettingsView {
    pub fn new(identity: &Identity, settings: Settings, palette: &Palette) -> Self {
        Self {
            login: identity.login.clone(),
            settings,
            dark: palette.is_dark(),
            palette: palette
                .variables()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Displayable for SettingsView {
    fn display(&self, style: &Styler) -> String {
        let scopes = if self.settings.additional_scopes.is_empty() {
            "none".to_string()
        } else {
            self.settings
                .additional_scopes
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut output = format!(
            "{} (@{})\n  {}: {}\n  {}: {}\n  {}: {}{}\n  {}: {}",
            style.heading("Settings"),
            self.login,
            style.label("Display name"),
            self.settings.display_name,
            style.label("Email notifications"),
            if self.settings.email_notifications {
                "on"
            } else {
                "off"
            },
            style.label("Theme"),
            self.settings.theme,
            if self.dark { " (dark)" } else { "" },
            style.label("Additional scopes"),
            scopes
        );

        if !self.palette.is_empty() {
            output.push_str(&format!("\n  {}:", style.label("Palette")));
            for (name, value) in &self.palette {
                output.push_str(&format!("\n    {} {}", name, value));
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use showcase_core::{IssueRef, ProjectSubmission, Theme};

    fn plain() -> Styler<'static> {
        colored::control::set_override(false);
        static LIGHT: std::sync::OnceLock<Palette> = std::sync::OnceLock::new();
        Styler::new(LIGHT.get_or_init(Palette::light))
    }

    fn identity() -> Identity {
        Identity {
            id: 5,
            login: "octocat".into(),
            name: Some("Mona".into()),
            avatar_url: String::new(),
        }
    }

    #[test]
    fn receipt_shows_issue_link() {
        let receipt = ProjectReceipt {
            submission: ProjectSubmission {
                name: "Site".into(),
                url: "https://example.com".into(),
                description: String::new(),
                tags: vec![],
                timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                user: "octocat".into(),
            },
            issue: IssueRef {
                number: 12,
                html_url: "https://github.com/o/r/issues/12".into(),
            },
        };

        let text = receipt.display(&plain());
        assert!(text.contains("Submitted Site"));
        assert!(text.contains("#12 https://github.com/o/r/issues/12"));
    }

    #[test]
    fn settings_view_lists_dark_palette() {
        let settings = Settings {
            display_name: "Mona".into(),
            theme: Theme::Dark,
            ..Settings::default()
        };
        let view = SettingsView::new(&identity(), settings, &Palette::dark());

        let text = view.display(&plain());
        assert!(text.contains("Theme: dark (dark)"));
        assert!(text.contains("bg-color #24292e"));
        assert!(text.contains("Additional scopes: none"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["displayName"], "Mona");
        assert_eq!(json["dark"], true);
    }

    #[test]
    fn catalog_entry_without_submitter() {
        let entry = CatalogEntry {
            name: "Sample Project".into(),
            url: "https://github.com/username/sample-project".into(),
            description: "An example".into(),
            tags: vec!["js".into()],
            timestamp: None,
            user: None,
        };

        let text = entry.display(&plain());
        assert!(text.contains("Sample Project"));
        assert!(text.contains("Tags: js"));
        assert!(!text.contains("Submitted by"));
    }

    #[test]
    fn logged_out_session_view() {
        let view = SessionView {
            status: SessionStatus::LoggedOut,
            user: None,
        };
        assert!(view.display(&plain()).contains("Not logged in"));
    }
}
