use crate::app::App;
use crate::cli::{OutputFormat, ProjectCommands};
use crate::output::{output_list, output_result};
use anyhow::Result;
use chrono::Utc;
use showcase_core::{load_catalog, ProjectForm, Submitter};

pub fn handle_project(app: &App, action: &ProjectCommands) -> Result<()> {
    match action {
        ProjectCommands::Submit {
            name,
            url,
            description,
            tags,
        } => {
            let form = ProjectForm {
                name: name.clone(),
                url: url.clone(),
                description: description.clone(),
                tags: tags.clone(),
            };
            handle_submit(app, form)
        }
        ProjectCommands::List => handle_list(app),
    }
}

fn handle_submit(app: &App, form: ProjectForm) -> Result<()> {
    app.revalidate()?;

    let session = app.session();
    let receipt = Submitter::new(&session, app.host(), app.config.target())
        .submit_project(form, Utc::now())?;

    output_result(&receipt, app.format, &app.styler());
    Ok(())
}

fn handle_list(app: &App) -> Result<()> {
    let projects = load_catalog(app.host(), &app.config.target());

    if projects.is_empty() && app.format == OutputFormat::Text {
        println!("No projects submitted yet.");
        return Ok(());
    }

    output_list(&projects, app.format, &app.styler());
    Ok(())
}
