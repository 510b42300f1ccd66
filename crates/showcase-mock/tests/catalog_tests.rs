//! Project catalog reads against the recording host

use showcase_core::{load_catalog, RepoId};
use showcase_mock::{HostFixture, RecordingHost};

fn target() -> RepoId {
    RepoId::new("julieisbaka", "github-authentication-sample")
}

#[test]
fn test_catalog_entries_are_parsed() {
    let catalog = r#"[{
        "name": "Sample Project",
        "url": "https://github.com/username/sample-project",
        "description": "This is an example project submission",
        "tags": ["javascript", "web"],
        "timestamp": "2024-05-01T12:00:00Z",
        "user": "github_user"
    }]"#;
    let host = RecordingHost::new(HostFixture::default().with_file(
        "data/projects.json",
        "c1",
        catalog,
    ));

    let projects = load_catalog(&host, &target());
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Sample Project");
    assert_eq!(projects[0].tags, vec!["javascript", "web"]);
    assert_eq!(projects[0].user.as_deref(), Some("github_user"));
    assert!(projects[0].timestamp.is_some());

    let call = &host.calls()[0];
    assert_eq!(call.method, "get_file");
    assert_eq!(call.arg("ref"), Some("main"));
}

#[test]
fn test_missing_catalog_is_empty() {
    let host = RecordingHost::new(HostFixture::default());
    assert!(load_catalog(&host, &target()).is_empty());
}

#[test]
fn test_failed_or_malformed_catalog_is_empty() {
    let failing = RecordingHost::new(HostFixture::default().failing("get_file", None));
    assert!(load_catalog(&failing, &target()).is_empty());

    let malformed = RecordingHost::new(HostFixture::default().with_file(
        "data/projects.json",
        "c1",
        "{not json",
    ));
    assert!(load_catalog(&malformed, &target()).is_empty());
}

#[test]
fn test_entries_without_submitter_are_listed() {
    let catalog = r#"[
        {
            "name": "Sample Project",
            "url": "https://github.com/username/sample-project",
            "description": "This is an example project submission",
            "tags": ["javascript", "web"]
        },
        {"name": "Bare", "url": "https://example.com/bare"}
    ]"#;
    let host = RecordingHost::new(HostFixture::default().with_file(
        "data/projects.json",
        "c1",
        catalog,
    ));

    let projects = load_catalog(&host, &target());
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[0].user, None);
    assert_eq!(projects[0].timestamp, None);
    assert_eq!(projects[1].description, "");
    assert!(projects[1].tags.is_empty());
}

#[test]
fn test_malformed_entry_is_skipped_alone() {
    let catalog = r#"[
        {"name": "No Url"},
        {"name": "Kept", "url": "https://example.com/kept", "timestamp": "yesterday"},
        {"name": "Also Kept", "url": "https://example.com/also"}
    ]"#;
    let host = RecordingHost::new(HostFixture::default().with_file(
        "data/projects.json",
        "c1",
        catalog,
    ));

    let names: Vec<String> = load_catalog(&host, &target())
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Also Kept"]);
}
