use crate::app::App;
use crate::cli::{AuthCommands, OutputFormat};
use crate::output::{output_message, output_result, SessionView};
use anyhow::{Context, Result};
use chrono::Utc;
use showcase_core::session::parse_redirect;

pub fn handle_auth(app: &App, action: &AuthCommands) -> Result<()> {
    match action {
        AuthCommands::Login {
            token: Some(token), ..
        } => handle_token_login(app, token),
        AuthCommands::Login {
            no_browser,
            scopes,
            token: None,
        } => handle_login(app, *no_browser, scopes),
        AuthCommands::Callback { code, state, url } => {
            handle_callback(app, code.as_deref(), state.as_deref(), url.as_deref())
        }
        AuthCommands::Logout => {
            app.session().logout()?;
            output_message("Logged out.", app.format);
            Ok(())
        }
        AuthCommands::Status => handle_status(app),
    }
}

fn handle_token_login(app: &App, token: &str) -> Result<()> {
    let identity = app
        .session()
        .login_with_token(app.identity_provider(), token)?;

    output_result(&identity, app.format, &app.styler());
    Ok(())
}

fn handle_login(app: &App, no_browser: bool, scopes: &[String]) -> Result<()> {
    let session = app.session();
    let mut extra = scopes.to_vec();

    // Re-authorizing keeps the scopes chosen in settings
    if let Some(identity) = session.identity()? {
        let settings = app.settings().load(&identity)?;
        extra.extend(settings.additional_scopes);
    }

    let request = session.login(&app.config.oauth_app(), &extra, Utc::now())?;

    if !no_browser && app.format == OutputFormat::Text {
        if let Err(e) = open::that(&request.url) {
            tracing::warn!(error = %e, "could not open a browser");
        }
    }

    output_result(&request, app.format, &app.styler());
    Ok(())
}

fn handle_callback(
    app: &App,
    code: Option<&str>,
    state: Option<&str>,
    url: Option<&str>,
) -> Result<()> {
    let (code, state) = match url {
        Some(url) => parse_redirect(url).context("Login did not complete")?,
        None => (code.map(str::to_string), state.map(str::to_string)),
    };

    let exchange = app.exchange()?;
    let identity = app
        .session()
        .handle_callback(
            exchange.as_ref(),
            app.identity_provider(),
            code.as_deref(),
            state.as_deref(),
        )
        .context("Login did not complete")?;

    output_result(&identity, app.format, &app.styler());
    Ok(())
}

fn handle_status(app: &App) -> Result<()> {
    let session = app.session();
    let status = session.validate(app.identity_provider())?;
    let view = SessionView {
        status,
        user: session.identity()?,
    };

    output_result(&view, app.format, &app.styler());
    Ok(())
}
