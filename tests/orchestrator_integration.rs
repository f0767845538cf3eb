//! Integration tests for tree-level analysis.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use docgap::config::Config;
use docgap::scan::{analyze, FileError, Runner};
use docgap::Error;
use tempfile::TempDir;

fn project_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("project")
}

fn default_ignores() -> Vec<String> {
    Config::default().ignore_patterns
}

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_project_summary() {
    let report = analyze(project_path(), &default_ignores(), &[]).unwrap();
    let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "app/models.py",
            "cmd/main.go",
            "core/lib.rs",
            "lib/buf.c",
            "lib/vec.hpp",
            "src/Main.java",
            "web/app.js",
            "web/types.ts",
        ]
    );

    let s = &report.summary;
    assert_eq!(s.files_scanned, 8);
    assert_eq!(s.files_skipped, 1, "README.md has no language");
    assert_eq!(s.files_failed, 0);
    assert_eq!(s.declarations_found, 34);
    assert_eq!(s.declarations_undocumented, 19);
    assert_eq!(s.declarations_documented, 15);
    assert_eq!(s.languages.len(), 8);
    assert_eq!(s.languages["javascript"].undocumented, 4);
    assert!(!report.cancelled);
}

#[test]
fn test_ignored_paths_never_reported() {
    let report = analyze(project_path(), &default_ignores(), &[]).unwrap();
    assert!(report
        .files
        .iter()
        .all(|f| !f.path.starts_with("node_modules/") && !f.path.starts_with("build/")));

    let mut ignores = default_ignores();
    ignores.push("web/**".to_string());
    ignores.push("**/*.hpp".to_string());
    let report = analyze(project_path(), &ignores, &[]).unwrap();
    assert!(report.files.iter().all(|f| !f.path.starts_with("web/")));
    assert!(report.files.iter().all(|f| !f.path.ends_with(".hpp")));
    assert_eq!(report.summary.files_scanned, 5);
}

#[test]
fn test_without_ignores_dependency_trees_are_scanned() {
    let report = analyze(project_path(), &[], &[]).unwrap();
    assert!(report.files.iter().any(|f| f.path == "node_modules/leftpad/index.js"));
    assert!(report.files.iter().any(|f| f.path == "build/bundle.js"));
}

#[test]
fn test_ignored_directory_is_not_read() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "ok.py", b"def f():\n    pass\n");
    let locked = temp.path().join("vendor");
    std::fs::create_dir(&locked).unwrap();
    write(temp.path(), "vendor/x.py", b"def g():\n    pass\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    }

    let report = analyze(temp.path(), &["vendor/**".to_string()], &[]).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].path, "ok.py");
}

#[test]
fn test_language_allowlist() {
    let report = analyze(
        project_path(),
        &default_ignores(),
        &["go".to_string(), "rs".to_string()],
    )
    .unwrap();
    let languages: Vec<_> = report.files.iter().map(|f| f.language.as_str()).collect();
    assert_eq!(languages, ["go", "rust"]);
    assert_eq!(report.summary.files_skipped, 7);
}

#[test]
fn test_analysis_is_idempotent_and_independent_of_pool_size() {
    let first = Runner::new(project_path())
        .ignore_patterns(default_ignores())
        .jobs(Some(1))
        .run()
        .unwrap();
    let second = Runner::new(project_path())
        .ignore_patterns(default_ignores())
        .jobs(Some(4))
        .run()
        .unwrap();
    let third = Runner::new(project_path())
        .ignore_patterns(default_ignores())
        .run()
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn test_empty_directory() {
    let temp = TempDir::new().unwrap();
    let report = analyze(temp.path(), &[], &[]).unwrap();
    assert!(report.files.is_empty());
    assert_eq!(report.summary.declarations_found, 0);
    assert_eq!(report.summary.files_failed, 0);
    assert!(report.failures().next().is_none());
    assert!(!report.has_undocumented());
}

#[test]
fn test_bad_file_does_not_discard_others() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", b"def a():\n    pass\n");
    write(temp.path(), "b.py", b"def b():\n    s = '\xe9t\xe9'\n");
    write(temp.path(), "c.js", b"\x00\x01\x02function c() {}");
    write(temp.path(), "d.js", b"function d() {}\n");

    let report = analyze(temp.path(), &[], &[]).unwrap();
    assert_eq!(report.files.len(), 4);
    assert_eq!(report.summary.files_scanned, 2);
    assert_eq!(report.summary.files_failed, 2);
    assert!(matches!(report.files[1].error, Some(FileError::Decode { .. })));
    assert_eq!(report.files[2].error, Some(FileError::Binary));
    let names: Vec<_> = report.undocumented().map(|(_, c)| c.name.as_str()).collect();
    assert_eq!(names, ["a", "d"]);

    let report = Runner::new(temp.path()).encoding("latin-1").run().unwrap();
    assert_eq!(report.summary.files_failed, 1, "only the binary file fails");
    let b = report.files.iter().find(|f| f.path == "b.py").unwrap();
    assert_eq!(b.findings.len(), 1);
}

#[test]
fn test_unbalanced_file_reports_no_error() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "h.js", b"function h() { return 1;");
    let report = analyze(temp.path(), &[], &[]).unwrap();
    let file = &report.files[0];
    assert!(file.error.is_none());
    assert_eq!(file.findings.len(), 1);
    assert_eq!(file.findings[0].candidate.end_line, Some(0));
}

#[test]
fn test_oversized_files_are_recorded() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "big.rs", "fn f() {}\n".repeat(1000).as_bytes());
    let report = Runner::new(temp.path())
        .max_file_size(Some(1024))
        .run()
        .unwrap();
    assert!(matches!(
        report.files[0].error,
        Some(FileError::TooLarge { limit: 1024, .. })
    ));
}

#[test]
fn test_cancelled_run_is_flagged() {
    let flag = Arc::new(AtomicBool::new(true));
    let report = Runner::new(project_path())
        .ignore_patterns(default_ignores())
        .cancel_flag(flag)
        .run()
        .unwrap();
    assert!(report.cancelled);
    assert!(report.files.is_empty());
    assert_eq!(report.summary.files_skipped, 1);
}

#[test]
fn test_config_errors_precede_filesystem_errors() {
    let missing = PathBuf::from("/no/such/root/anywhere");
    assert!(matches!(
        analyze(&missing, &["a/[".to_string()], &[]),
        Err(Error::InvalidPattern { .. })
    ));
    assert!(matches!(
        analyze(&missing, &[], &["kotlin".to_string()]),
        Err(Error::UnknownLanguage(_))
    ));
    assert!(matches!(
        analyze(&missing, &[], &[]),
        Err(Error::RootNotFound(_))
    ));
}

#[test]
fn test_config_runner_applies_settings() {
    let config = Config {
        languages: vec!["python".to_string()],
        max_body_lines: 1,
        ..Config::default()
    };
    let report = config.runner(project_path()).run().unwrap();
    assert_eq!(report.files.len(), 1);
    for (_, ctx) in report.undocumented() {
        assert!(ctx.body.len() <= 1);
    }
}
