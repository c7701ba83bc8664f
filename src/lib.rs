//! Lease Contract DLL
//!
//! C ABI bridge for host applications. Inputs cross the boundary as UTF-8
//! JSON strings in the same camelCase shape the web application uses.

use lease_pdf_creator::{
    validate_contract, ClauseOverrides, ContractData, GenerationError, GenerationOptions,
    LayoutConfig, LeaseContractEngine,
};
use log::{error, info};
use serde::Deserialize;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

/// Return codes of `generate_lease_contract_ffi`.
const STATUS_OK: c_int = 0;
const STATUS_INVALID_CONTRACT: c_int = 1;
const STATUS_FAILED: c_int = -1;

/// Options JSON: generation options plus an optional layout override.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FfiOptions {
    #[serde(flatten)]
    generation: GenerationOptions,
    config: Option<LayoutConfig>,
}

/// Generate a lease contract PDF at `output_path`.
///
/// `overrides_json` and `options_json` may be null.
///
/// Returns 0 on success, 1 when the contract data fails validation and -1
/// for any other failure (bad arguments, unparsable JSON, I/O).
#[no_mangle]
pub extern "C" fn generate_lease_contract_ffi(
    contract_json: *const c_char,
    overrides_json: *const c_char,
    options_json: *const c_char,
    output_path: *const c_char,
) -> c_int {
    if contract_json.is_null() || output_path.is_null() {
        return STATUS_FAILED;
    }

    let contract_json = unsafe { CStr::from_ptr(contract_json).to_string_lossy().into_owned() };
    let overrides_json = unsafe { optional_string(overrides_json) };
    let options_json = unsafe { optional_string(options_json) };
    let output_path = unsafe { CStr::from_ptr(output_path).to_string_lossy().into_owned() };

    match generate_from_json(
        &contract_json,
        overrides_json.as_deref(),
        options_json.as_deref(),
        &output_path,
    ) {
        Ok(page_count) => {
            info!("Wrote {} page contract to {}", page_count, output_path);
            STATUS_OK
        }
        Err(FfiFailure::Invalid(e)) => {
            error!("Contract rejected: {}", e);
            STATUS_INVALID_CONTRACT
        }
        Err(FfiFailure::Other(message)) => {
            error!("PDF generation failed: {}", message);
            STATUS_FAILED
        }
    }
}

/// Number of validation errors in `contract_json`, or -1 when it cannot be
/// parsed.
#[no_mangle]
pub extern "C" fn validate_lease_contract_ffi(contract_json: *const c_char) -> c_int {
    if contract_json.is_null() {
        return STATUS_FAILED;
    }
    let contract_json = unsafe { CStr::from_ptr(contract_json).to_string_lossy().into_owned() };

    match serde_json::from_str::<ContractData>(&contract_json) {
        Ok(data) => {
            let errors = validate_contract(&data);
            for e in &errors.errors {
                info!("{}: {}", e.field, e.message);
            }
            errors.len() as c_int
        }
        Err(e) => {
            error!("Unparsable contract JSON: {}", e);
            STATUS_FAILED
        }
    }
}

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn optional_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug)]
enum FfiFailure {
    Invalid(GenerationError),
    Other(String),
}

fn generate_from_json(
    contract_json: &str,
    overrides_json: Option<&str>,
    options_json: Option<&str>,
    output_path: &str,
) -> Result<usize, FfiFailure> {
    let data: ContractData = parse("contract", contract_json)?;
    let overrides: ClauseOverrides = match overrides_json {
        Some(json) => parse("overrides", json)?,
        None => ClauseOverrides::default(),
    };
    let options: FfiOptions = match options_json {
        Some(json) => parse("options", json)?,
        None => FfiOptions::default(),
    };

    let engine = LeaseContractEngine::new(options.config.unwrap_or_default())
        .map_err(|e| FfiFailure::Other(e.to_string()))?;
    let contract = engine
        .generate(&data, &overrides, &options.generation)
        .map_err(|e| match e {
            GenerationError::Validation(_) => FfiFailure::Invalid(e),
            other => FfiFailure::Other(other.to_string()),
        })?;

    contract
        .save(output_path)
        .map_err(|e| FfiFailure::Other(format!("failed to write {}: {}", output_path, e)))?;
    Ok(contract.page_count)
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, FfiFailure> {
    serde_json::from_str(json).map_err(|e| FfiFailure::Other(format!("invalid {} JSON: {}", what, e)))
}
