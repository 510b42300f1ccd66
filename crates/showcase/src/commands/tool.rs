use crate::app::App;
use crate::cli::ToolCommands;
use crate::output::output_result;
use anyhow::Result;
use chrono::Utc;
use showcase_core::{Submitter, ToolFile, ToolForm};
use std::fs;
use std::io;
use std::path::Path;

pub fn handle_tool(app: &App, action: &ToolCommands) -> Result<()> {
    match action {
        ToolCommands::Submit {
            name,
            description,
            tags,
            dir,
            folder,
        } => {
            let (folder, files) = collect_files(
                dir.as_deref(),
                folder.as_deref(),
                app.config.max_file_bytes,
            );
            let form = ToolForm {
                name: name.clone(),
                description: description.clone(),
                tags: tags.clone(),
                folder,
                files,
            };
            handle_submit(app, form)
        }
    }
}

fn handle_submit(app: &App, form: ToolForm) -> Result<()> {
    app.revalidate()?;

    let session = app.session();
    let report = Submitter::new(&session, app.host(), app.config.target())
        .with_options(app.config.workflow_options())
        .submit_tool(form, Utc::now())?;

    output_result(&report, app.format, &app.styler());
    Ok(())
}

/// Folder name and files for a submission.
///
/// An unreadable directory falls back to the manual path: the folder name
/// alone and no files.
fn collect_files(
    dir: Option<&Path>,
    folder: Option<&str>,
    max_file_bytes: u64,
) -> (String, Vec<ToolFile>) {
    let Some(dir) = dir else {
        return (folder.unwrap_or_default().to_string(), Vec::new());
    };

    let folder = folder
        .map(str::to_string)
        .or_else(|| {
            dir.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    match read_directory(dir, max_file_bytes) {
        Ok(files) => {
            tracing::info!(dir = %dir.display(), count = files.len(), "collected files");
            (folder, files)
        }
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "directory not readable");
            eprintln!(
                "Warning: could not read {} ({}); submitting folder '{}' without files",
                dir.display(),
                e,
                folder
            );
            (folder, Vec::new())
        }
    }
}

/// Regular files directly inside `dir`, sorted by name.
///
/// Only a directory that cannot be listed is an error. Entries that fail are
/// reported and left out, and files over `max_file_bytes` are kept by size
/// without reading them.
fn read_directory(dir: &Path, max_file_bytes: u64) -> io::Result<Vec<ToolFile>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn_skipped(dir, &e);
                continue;
            }
        };
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        match read_file(&path, name, max_file_bytes) {
            Ok(Some(file)) => files.push(file),
            Ok(None) => {}
            Err(e) => warn_skipped(&path, &e),
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn read_file(path: &Path, name: String, max_file_bytes: u64) -> io::Result<Option<ToolFile>> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Ok(None);
    }
    if metadata.len() > max_file_bytes {
        return Ok(Some(ToolFile::size_only(name, metadata.len())));
    }
    Ok(Some(ToolFile::new(name, fs::read(path)?)))
}

fn warn_skipped(path: &Path, error: &io::Error) {
    tracing::warn!(path = %path.display(), error = %error, "skipping unreadable entry");
    eprintln!("Warning: skipping {} ({})", path.display(), error);
}
