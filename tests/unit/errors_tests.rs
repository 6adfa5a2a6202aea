/*!
 * Tests for error types and conversions
 */

use std::path::PathBuf;
use tplmin::errors::{AppError, MinifyError};

#[test]
fn test_minifyError_js_shouldDisplayCorrectly() {
    let error = MinifyError::Js("unterminated string".to_string());
    let display = format!("{}", error);
    assert!(display.contains("JavaScript minification failed"));
    assert!(display.contains("unterminated string"));
}

#[test]
fn test_minifyError_markerLeak_shouldNameMarker() {
    let error = MinifyError::MarkerLeak("tplmin0000beef".to_string());
    assert!(format!("{}", error).contains("tplmin0000beef"));
}

#[test]
fn test_appError_fromMinifyError_shouldWrap() {
    let error: AppError = MinifyError::Css("bad".to_string()).into();
    assert!(matches!(error, AppError::Minify(MinifyError::Css(_))));
    assert!(format!("{}", error).contains("CSS minification failed"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}

#[test]
fn test_appError_pathNotFound_shouldDisplayPath() {
    let error = AppError::PathNotFound(PathBuf::from("missing/dir"));
    assert!(format!("{}", error).contains("missing/dir"));
}
