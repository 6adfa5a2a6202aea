/*!
 * End-to-end tests for minifying template trees
 */

use std::fs;
use anyhow::Result;
use tplmin::app_config::Config;
use tplmin::app_controller::{Controller, FileOutcome};
use tplmin::errors::MinifyError;
use tplmin::minifiers::{BuiltinCssMinifier, CssMinifyOptions, JsMinifier};
use tplmin::template::TemplateMinifier;
use crate::common;

const EXPECTED_TEMPLATE: &str = "<html>\n\n<style>body{margin:0}</style>\n<script>var title={%$title%};{%if $debug%}console.log(title);{%/if%}</script>\n</html>\n";

fn config_for(output_dir: &std::path::Path) -> Config {
    Config {
        output_dir: output_dir.to_path_buf(),
        concurrency: 2,
        ..Config::default()
    }
}

/// Test that a directory tree is mirrored with every template minified
#[tokio::test]
async fn test_run_withTemplateTree_shouldMirrorMinifiedFiles() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("site");
    let output = temp_dir.path().join("out");
    common::create_test_template(&input, "index.tpl")?;
    common::create_test_template(&input, "admin/users.tpl")?;
    common::create_test_file(&input, ".git/HEAD", "ref: refs/heads/main")?;

    let controller = Controller::with_config(config_for(&output))?;
    let report = controller.run(&input).await?;

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.minified_count(), 2);

    for report in &report.files {
        assert_eq!(report.outcome, FileOutcome::Minified);
        assert_eq!(fs::read_to_string(&report.output)?, EXPECTED_TEMPLATE);
        assert!(report.output.starts_with(&output));
        assert!(report.output.ends_with(report.input.file_name().unwrap()));
    }

    let git_head = tplmin::file_utils::FileManager::mirrored_output_path(&output, input.join(".git/HEAD"));
    assert!(!git_head.exists());

    Ok(())
}

/// Test that a document the JS minifier rejects is copied byte for byte
#[tokio::test]
async fn test_run_withBrokenScript_shouldCopyOriginal() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("site");
    let output = temp_dir.path().join("out");
    let original = "<!-- kept -->\n<script>\n  var s = 'never closed;\n</script>\n";
    let broken = common::create_test_file(&input, "broken.tpl", original)?;
    common::create_test_template(&input, "fine.tpl")?;

    let report = Controller::with_config(config_for(&output))?.run(&input).await?;

    let entry = report.get(&broken).expect("broken.tpl should be reported");
    assert!(matches!(entry.outcome, FileOutcome::Copied { .. }));
    assert_eq!(fs::read_to_string(&entry.output)?, original);
    assert_eq!(report.minified_count(), 1);
    assert_eq!(report.copied_count(), 1);

    Ok(())
}

/// Test that non-UTF-8 files are copied unchanged
#[tokio::test]
async fn test_run_withBinaryFile_shouldCopyBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("site");
    let output = temp_dir.path().join("out");
    fs::create_dir_all(&input)?;
    let bytes = vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0xfe, 0x00];
    let image = input.join("logo.png");
    fs::write(&image, &bytes)?;

    let report = Controller::with_config(config_for(&output))?.run(&input).await?;

    let entry = report.get(&image).expect("logo.png should be reported");
    assert!(matches!(entry.outcome, FileOutcome::Copied { .. }));
    assert_eq!(fs::read(&entry.output)?, bytes);

    Ok(())
}

/// JS minifier that fails on every script
struct FailingJsMinifier;

impl JsMinifier for FailingJsMinifier {
    fn minify(&self, _source: &str, _keep_comment: &dyn Fn(&str) -> bool) -> Result<String, MinifyError> {
        Err(MinifyError::Js("minifier unavailable".to_string()))
    }
}

/// Test that a custom pipeline plugs into the controller and its failures fall back to copies
#[tokio::test]
async fn test_run_withFailingCustomMinifier_shouldCopyScriptsOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("site");
    let output = temp_dir.path().join("out");
    let with_script = common::create_test_template(&input, "page.tpl")?;
    let style_only = common::create_test_file(&input, "style.tpl", "<style> a { top: 0 } </style>")?;

    let minifier = TemplateMinifier::with_minifiers(
        FailingJsMinifier,
        BuiltinCssMinifier::new(),
        CssMinifyOptions::default(),
    );
    let controller = Controller::with_minifier(config_for(&output), minifier)?;
    let report = controller.run(&input).await?;

    let page = report.get(&with_script).unwrap();
    match &page.outcome {
        FileOutcome::Copied { reason } => assert!(reason.contains("minifier unavailable")),
        other => panic!("expected copy, got {:?}", other),
    }
    assert_eq!(fs::read_to_string(&page.output)?, fs::read_to_string(&with_script)?);

    let style = report.get(&style_only).unwrap();
    assert_eq!(style.outcome, FileOutcome::Minified);
    assert_eq!(fs::read_to_string(&style.output)?, "<style>a{top:0}</style>");

    Ok(())
}

/// Test that an output directory inside the input tree is not minified again
#[tokio::test]
async fn test_run_withOutputInsideInput_shouldSkipOutputTree() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("site");
    let output = input.join("build");
    common::create_test_template(&input, "index.tpl")?;
    common::create_test_file(&output, "stale.tpl", "<script>old()</script>")?;

    let report = Controller::with_config(config_for(&output))?.run(&input).await?;

    assert_eq!(report.files.len(), 1);
    assert!(report.get(input.join("index.tpl")).is_some());

    Ok(())
}

/// Test the library entry point on a single file
#[tokio::test]
async fn test_minify_withSingleFile_shouldWriteMirroredOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_template(temp_dir.path(), "single.tpl")?;
    let output = temp_dir.path().join("out");

    let report = tplmin::minify(&file, &config_for(&output)).await?;

    assert_eq!(report.files.len(), 1);
    let entry = &report.files[0];
    assert_eq!(entry.output, tplmin::file_utils::FileManager::mirrored_output_path(&output, &file));
    assert_eq!(fs::read_to_string(&entry.output)?, EXPECTED_TEMPLATE);

    Ok(())
}
