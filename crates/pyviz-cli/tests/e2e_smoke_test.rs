use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use pyviz_cli::{Args, InputKind, run};

const KINDS: [(&str, InputKind); 3] = [
    ("parse_tree", InputKind::ParseTree),
    ("object_tree", InputKind::ObjectTree),
    ("tokens", InputKind::Tokens),
];

/// Demos live at the workspace root, not inside the crate
fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .json files from a directory
fn collect_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args_for(input: &Path, kind: InputKind, output: &Path, config: Option<&Path>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        kind,
        output: output.to_string_lossy().to_string(),
        config: config.map(|path| path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_dir();

    let mut total = 0;
    let mut failed_demos = Vec::new();

    for (dir, kind) in KINDS {
        let inputs = collect_json_files(&demos.join(dir));
        assert!(!inputs.is_empty(), "No demos found in demos/{dir}/");

        for input in &inputs {
            total += 1;
            let output_path = temp_dir.path().join(format!(
                "{dir}_{}.svg",
                input.file_stem().unwrap().to_string_lossy()
            ));

            match run(&args_for(input, kind, &output_path, None)) {
                Ok(()) => {
                    let svg = fs::read_to_string(&output_path).expect("SVG not written");
                    assert!(svg.starts_with("<svg"), "{} is not SVG", input.display());
                }
                Err(e) => failed_demos.push((input.clone(), e)),
            }
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {total} valid demos passed");
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let errors = demos_dir().join("errors");

    let mut total = 0;
    let mut unexpectedly_succeeded = Vec::new();

    for (dir, kind) in KINDS {
        for input in &collect_json_files(&errors.join(dir)) {
            total += 1;
            let output_path = temp_dir.path().join(format!(
                "error_{dir}_{}.svg",
                input.file_stem().unwrap().to_string_lossy()
            ));

            if run(&args_for(input, kind, &output_path, None)).is_ok() {
                unexpectedly_succeeded.push(input.clone());
            }
        }
    }

    assert!(total > 0, "No error demos found in demos/errors/");

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("✅ All {total} error demos failed as expected");
}

#[test]
fn e2e_smoke_test_demo_config() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = demos_dir();
    let output_path = temp_dir.path().join("configured.svg");

    let args = args_for(
        &demos.join("parse_tree").join("if_else.json"),
        InputKind::ParseTree,
        &output_path,
        Some(&demos.join("config.toml")),
    );
    run(&args).expect("Demo config should render");

    let svg = fs::read_to_string(&output_path).unwrap();
    assert!(svg.contains("Compare"));
}
