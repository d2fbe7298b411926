use super::error::PdfError;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use std::sync::Mutex;

/// Cached outcome of the first attempt to bind the system Pdfium library.
enum InitializationState {
    Uninitialized,
    Initialized,
    Failed(String),
}

/// Binding is attempted once per process. A failure is remembered so later
/// jobs fail fast instead of probing the filesystem again.
static PDFIUM_STATE: Lazy<Mutex<InitializationState>> = Lazy::new(|| Mutex::new(InitializationState::Uninitialized));

/// Get Pdfium bindings with lazy initialization.
///
/// # Arguments
///
/// * `map_err` - Function to map error strings to `PdfError` variants
/// * `context` - Context string for error reporting
pub(crate) fn bind_pdfium(
    map_err: fn(String) -> PdfError,
    context: &'static str,
) -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    let mut state = PDFIUM_STATE
        .lock()
        .map_err(|e| map_err(format!("Failed to acquire lock on Pdfium state ({}): {}", context, e)))?;

    match &*state {
        InitializationState::Uninitialized => match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                *state = InitializationState::Initialized;
                tracing::debug!(context, "Pdfium bound to system library");
                return Ok(bindings);
            }
            Err(err) => {
                let msg = err.to_string();
                *state = InitializationState::Failed(msg.clone());
                tracing::warn!(context, error = %msg, "Pdfium initialization failed");
                return Err(map_err(format!("Pdfium initialization failed ({}): {}", context, msg)));
            }
        },
        InitializationState::Failed(err) => {
            return Err(map_err(format!(
                "Pdfium initialization previously failed ({}): {}",
                context, err
            )));
        }
        InitializationState::Initialized => {}
    }

    Pdfium::bind_to_system_library()
        .map_err(|e| map_err(format!("Failed to create Pdfium bindings ({}): {}", context, e)))
}
