// tests/config_test.rs
use std::fs;
use std::io::Write;

use note_publish::config::{expand_path, load_config, save_config, Config};
use note_publish::error::IssueKind;
use note_publish::PublishError;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
generator_project_path = "/srv/garden"
markdown_source_path = "/srv/notes"
html_output_path = "/srv/garden/public"
also_sync_markdown = true

[generator]
command = "npm run build -- --in {source} --out {output}"
path_prepend = ["/opt/node/bin"]

[git]
remote = "upstream"
branch = "main"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.generator_project_path, "/srv/garden");
    assert!(config.also_sync_markdown);
    assert_eq!(config.generator.shell, "bash");
    assert_eq!(config.generator.path_prepend, vec!["/opt/node/bin"]);
    assert_eq!(config.git.remote, "upstream");
    assert_eq!(config.git.branch, "main");
    assert!(config.deploy.write_descriptor);
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"also_sync_markdown = \"yes please\"").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, PublishError::Config(_)));
    assert!(err.to_string().contains("cannot parse"));
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let err = load_config(Some("/no/such/notepublish.toml")).unwrap_err();
    assert!(err.to_string().contains("cannot read"));
}

#[test]
fn test_save_then_load_preserves_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/notepublish.toml");

    let mut config = Config {
        generator_project_path: "~/garden".to_string(),
        markdown_source_path: "~/notes".to_string(),
        html_output_path: "~/garden/public".to_string(),
        also_sync_markdown: true,
        ..Config::default()
    };
    config.git.site_repository = Some("~/site".to_string());

    save_config(&path, &config).unwrap();
    let loaded = load_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_default_config_omits_site_repository() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notepublish.toml");
    save_config(&path, &Config::default()).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("generator_project_path = \"\""));
    assert!(!written.contains("site_repository"));
}

#[test]
fn test_validate_against_real_directories() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir.txt");
    fs::write(&file, "x").unwrap();

    let config = Config {
        generator_project_path: dir.path().to_string_lossy().into_owned(),
        markdown_source_path: file.to_string_lossy().into_owned(),
        html_output_path: dir.path().join("public").to_string_lossy().into_owned(),
        ..Config::default()
    };

    let issues = config.validate();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].field, "markdown_source_path");
    assert!(matches!(issues[0].problem, IssueKind::NotADirectory(_)));
    assert_eq!(issues[1].field, "html_output_path");
    assert!(matches!(issues[1].problem, IssueKind::Missing(_)));
    assert!(matches!(
        config.ensure_valid(),
        Err(PublishError::InvalidConfig(_))
    ));

    fs::create_dir(dir.path().join("public")).unwrap();
    fs::remove_file(&file).unwrap();
    fs::create_dir(&file).unwrap();
    assert!(config.validate().is_empty());
    assert!(config.ensure_valid().is_ok());
}

#[test]
fn test_tilde_expansion() {
    let expanded = expand_path("~/notes");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.ends_with("notes"));
    assert_eq!(expand_path(" /abs/path "), std::path::PathBuf::from("/abs/path"));
}
