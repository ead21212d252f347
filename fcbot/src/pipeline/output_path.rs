//! Output file preparation.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::errors::ExportError;

/// Makes sure an exporter can write `path`.
///
/// Missing parent directories are created. An existing file is reported
/// and will be overwritten.
///
/// # Errors
///
/// Returns [`ExportError::NotWritable`] if the directories cannot be
/// created, the path exists but is not a file, or the file or its
/// directory is read-only.
pub async fn prepare_output(path: &Path, step: &str) -> Result<(), ExportError> {
    let not_writable = |reason: String| ExportError::NotWritable {
        path: path.to_path_buf(),
        reason,
    };

    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {
                if meta.permissions().readonly() {
                    return Err(not_writable(format!("directory {} is read-only", dir.display())));
                }
            }
            Ok(_) => {
                return Err(not_writable(format!("{} is not a directory", dir.display())));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(step = %step, dir = %dir.display(), "Output directory does not exist and will be created");
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| not_writable(format!("cannot create {}: {e}", dir.display())))?;
            }
            Err(e) => return Err(not_writable(e.to_string())),
        }
    }

    match tokio::fs::metadata(path).await {
        Ok(meta) if !meta.is_file() => Err(not_writable("path exists and is not a file".to_string())),
        Ok(meta) if meta.permissions().readonly() => {
            Err(not_writable("file is read-only".to_string()))
        }
        Ok(_) => {
            warn!(step = %step, path = %path.display(), "Output file exists and will be overwritten");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(not_writable(e.to_string())),
    }
}
