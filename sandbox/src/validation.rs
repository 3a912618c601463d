//! WASM module validation — ABI compatibility checks.
//!
//! A module is accepted only if:
//!
//! 1. It exports `main` with no parameters and no results
//! 2. It exports its linear memory as `memory`
//! 3. Every import comes from the `ethereum` module and is a function
//! 4. No WASI imports

use crate::error::SandboxError;
use wasmtime::{ExternType, Module};

/// Entry point every module must export.
const ENTRY_EXPORT: &str = "main";

/// The only import namespace a module may use.
const ALLOWED_IMPORT_MODULE: &str = "ethereum";

/// Validate that a WASM module meets the host ABI requirements.
pub fn validate_module(module: &Module) -> Result<(), SandboxError> {
    validate_exports(module)?;
    validate_imports(module)?;
    Ok(())
}

/// Check the memory export and the `main` entry signature.
fn validate_exports(module: &Module) -> Result<(), SandboxError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(SandboxError::ValidationError(
            "module must export 'memory'".into(),
        ));
    }

    let export = module
        .exports()
        .find(|e| e.name() == ENTRY_EXPORT)
        .ok_or_else(|| {
            SandboxError::ValidationError(format!("missing required export: {}", ENTRY_EXPORT))
        })?;

    let func_ty = match export.ty() {
        ExternType::Func(ft) => ft,
        _ => {
            return Err(SandboxError::ValidationError(format!(
                "export '{}' must be a function",
                ENTRY_EXPORT
            )));
        }
    };

    // The entry point takes no arguments and returns nothing; all
    // input and output moves through host calls.
    if func_ty.params().len() != 0 || func_ty.results().len() != 0 {
        return Err(SandboxError::ValidationError(format!(
            "export '{}' must have signature () -> (), got {} params and {} results",
            ENTRY_EXPORT,
            func_ty.params().len(),
            func_ty.results().len()
        )));
    }

    Ok(())
}

/// Check that all imports are functions from `ethereum` and none are WASI.
fn validate_imports(module: &Module) -> Result<(), SandboxError> {
    for import in module.imports() {
        let module_name = import.module();

        if module_name.starts_with("wasi") {
            return Err(SandboxError::ValidationError(format!(
                "WASI import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }

        if module_name != ALLOWED_IMPORT_MODULE {
            return Err(SandboxError::ValidationError(format!(
                "import from unknown module '{}' (only '{}' allowed): {}",
                module_name,
                ALLOWED_IMPORT_MODULE,
                import.name()
            )));
        }

        if !matches!(import.ty(), ExternType::Func(_)) {
            return Err(SandboxError::ValidationError(format!(
                "non-function import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }
    }

    Ok(())
}
