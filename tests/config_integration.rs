use std::path::PathBuf;

use twinmark::config::{ConfigFlags, load_config_flags, parse_flag_tokens, save_config_flags};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".twinmarkrc");
    let content = r#"
# comment
--pretty

--content-dir src/content/blog

--excerpt-limit=90
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.pretty);
    assert!(!flags.verbose);
    assert_eq!(flags.content_dir, Some(PathBuf::from("src/content/blog")));
    assert_eq!(flags.excerpt_limit, Some(90));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".twinmarkrc");
    std::fs::write(&path, "--pretty\n--content-dir posts\n--excerpt-limit 50\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "twinmark".to_string(),
        "--content-dir=drafts".to_string(),
        "--verbose".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.pretty, "file flags should remain enabled");
    assert!(effective.verbose, "cli flags should be applied");
    assert_eq!(
        effective.content_dir,
        Some(PathBuf::from("drafts")),
        "cli should override the content dir"
    );
    assert_eq!(
        effective.excerpt_limit,
        Some(50),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_local_file_overrides_global_file() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("global").join("config");
    let local = dir.path().join(".twinmarkrc");
    save_config_flags(
        &global,
        &ConfigFlags {
            content_dir: Some(PathBuf::from("global-posts")),
            verbose: true,
            ..ConfigFlags::default()
        },
    )
    .unwrap();
    save_config_flags(
        &local,
        &ConfigFlags {
            content_dir: Some(PathBuf::from("local-posts")),
            ..ConfigFlags::default()
        },
    )
    .unwrap();

    let merged = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert!(merged.verbose);
    assert_eq!(merged.content_dir, Some(PathBuf::from("local-posts")));
}

#[test]
fn test_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}
