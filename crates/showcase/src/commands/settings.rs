use crate::app::App;
use crate::cli::{SettingsCommands, ThemeChoice};
use crate::output::{output_message, output_result, SettingsView};
use anyhow::{anyhow, bail, Result};
use showcase_core::settings::OPTIONAL_SCOPES;
use showcase_core::{Identity, Settings, ShowcaseError};

pub fn handle_settings(app: &mut App, action: &SettingsCommands) -> Result<()> {
    let identity = current_identity(app)?;

    match action {
        SettingsCommands::Show => {
            let settings = app.settings().load(&identity)?;
            show(app, &identity, settings);
            Ok(())
        }
        SettingsCommands::Set {
            display_name,
            email_notifications,
            theme,
            scopes,
            clear_scopes,
        } => {
            let mut settings = app.settings().load(&identity)?;
            apply_changes(
                &mut settings,
                display_name.as_deref(),
                *email_notifications,
                *theme,
                scopes,
                *clear_scopes,
            )?;
            app.settings().save(&identity, &settings)?;

            app.theme.apply(settings.theme);
            show(app, &identity, settings);
            Ok(())
        }
        SettingsCommands::Disconnect => {
            app.settings().disconnect(&identity, &app.session())?;
            output_message("Disconnected. Settings removed and logged out.", app.format);
            Ok(())
        }
    }
}

fn current_identity(app: &App) -> Result<Identity> {
    match app.session().require() {
        Ok((_, identity)) => Ok(identity),
        Err(ShowcaseError::NotAuthenticated) => Err(anyhow!(
            "You must be logged in to manage settings (run 'showcase auth login')"
        )),
        Err(e) => Err(e.into()),
    }
}

fn show(app: &App, identity: &Identity, settings: Settings) {
    let view = SettingsView::new(identity, settings, app.theme.palette());
    output_result(&view, app.format, &app.styler());
}

fn apply_changes(
    settings: &mut Settings,
    display_name: Option<&str>,
    email_notifications: Option<bool>,
    theme: Option<ThemeChoice>,
    scopes: &[String],
    clear_scopes: bool,
) -> Result<()> {
    if let Some(name) = display_name {
        settings.display_name = name.to_string();
    }
    if let Some(enabled) = email_notifications {
        settings.email_notifications = enabled;
    }
    if let Some(theme) = theme {
        settings.theme = theme.into();
    }
    if clear_scopes {
        settings.additional_scopes.clear();
    }
    for scope in scopes {
        if !OPTIONAL_SCOPES.contains(&scope.as_str()) {
            bail!(
                "Scope '{}' is not offered (available: {})",
                scope,
                OPTIONAL_SCOPES.join(", ")
            );
        }
        settings.additional_scopes.insert(scope.clone());
    }
    Ok(())
}
