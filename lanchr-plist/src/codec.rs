//! Read and write descriptor files.
//!
//! ## `write`: validated atomic save
//!
//! 1. Validate according to the requested [`Validation`] mode.
//! 2. Encode as XML to a `<file>.tmp` sibling.
//! 3. `chmod 0644` the temporary file.
//! 4. Rename over the target (same directory, so the rename is atomic).

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::descriptor::Descriptor;
use crate::error::{io_err, PlistError, ValidationError};

/// How much checking `write` performs before touching disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validation {
    /// Label, program, and an existing binary are all required.
    #[default]
    Full,
    /// Only the label is required. Used by import, where the binary may not
    /// be installed yet.
    LabelOnly,
}

/// Parse an XML, binary, or OpenStep descriptor file.
pub fn parse(path: &Path) -> Result<Descriptor, PlistError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    plist::from_reader(Cursor::new(bytes)).map_err(|source| PlistError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate and atomically write `descriptor` as XML at `path`.
pub fn write(descriptor: &Descriptor, path: &Path, validation: Validation) -> Result<(), PlistError> {
    let errors = match validation {
        Validation::Full => validate(descriptor),
        Validation::LabelOnly => validate_label(descriptor).into_iter().collect(),
    };
    if !errors.is_empty() {
        return Err(PlistError::Invalid {
            path: path.to_path_buf(),
            errors,
        });
    }

    let tmp = tmp_path(path);
    plist::to_file_xml(&tmp, descriptor).map_err(|source| PlistError::Encode {
        path: tmp.clone(),
        source,
    })?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::debug!("wrote descriptor: {}", path.display());
    Ok(())
}

/// Every problem with `descriptor`, in field order. Empty when valid.
pub fn validate(descriptor: &Descriptor) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = validate_label(descriptor).into_iter().collect();

    match descriptor.program_path() {
        None => errors.push(ValidationError::new(
            "Program",
            "either Program or ProgramArguments is required",
        )),
        Some(program) => {
            if !Path::new(program).exists() {
                errors.push(ValidationError::new(
                    "Program",
                    format!("binary not found at {program}"),
                ));
            }
        }
    }

    errors
}

fn validate_label(descriptor: &Descriptor) -> Option<ValidationError> {
    match descriptor.label() {
        Some(_) => None,
        None => Some(ValidationError::new("Label", "Label is required")),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "descriptor.plist".to_string());
    path.with_file_name(format!("{name}.tmp"))
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), PlistError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), PlistError> {
    Ok(())
}
