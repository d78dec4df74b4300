use std::path::PathBuf;

use mdlens::config::{ConfigFlags, ThemeMode, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mdlensrc");
    let content = r"
# comment
--toc

--theme light

--log-file=mdlens.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.toc);
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.log_file, Some(PathBuf::from("mdlens.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mdlensrc");
    let content = "--raw\n--theme light\n--export-dir file-exports\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "mdlens".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--no-watch".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.raw, "file flags should remain enabled");
    assert!(effective.no_watch, "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.export_dir,
        Some(PathBuf::from("file-exports")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "mdlens".to_string(),
        "--theme=dark".to_string(),
        "--export-dir=out/html".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.theme, Some(ThemeMode::Dark));
    assert_eq!(flags.export_dir, Some(PathBuf::from("out/html")));
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        files: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        toc: true,
        raw: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.files);
    assert!(merged.toc);
    assert!(merged.raw);
    assert!(!merged.no_watch);
}
