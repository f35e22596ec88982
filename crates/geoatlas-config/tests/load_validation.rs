// crates/geoatlas-config/tests/load_validation.rs
// ============================================================================
// Module: Catalog Load Validation Tests
// Description: Validate catalog file loading guards (size, encoding, io).
// Purpose: Ensure catalog input handling is strict at the file boundary.
// ============================================================================

//! Load-guard tests for catalog files.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;
use std::path::Path;

use geoatlas_config::Catalog;
use geoatlas_config::ParseError;
use geoatlas_config::catalog_json_example;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_fails(result: Result<Catalog, ParseError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected catalog load to fail".to_string()),
    }
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let path = Path::new("definitely-not-a-catalog.json");
    assert_fails(Catalog::load(path), "catalog io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_fails(Catalog::load(file.path()), "catalog file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_fails(Catalog::load(file.path()), "catalog file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_non_object_payload() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[1, 2, 3]").map_err(|err| err.to_string())?;
    assert_fails(Catalog::load(file.path()), "catalog root must be a json object")?;
    Ok(())
}

#[test]
fn load_accepts_example_payload() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(catalog_json_example().as_bytes()).map_err(|err| err.to_string())?;
    let catalog = Catalog::load(file.path()).map_err(|err| err.to_string())?;
    if catalog.services.len() == 2 {
        Ok(())
    } else {
        Err(format!("expected 2 services, found {}", catalog.services.len()))
    }
}
