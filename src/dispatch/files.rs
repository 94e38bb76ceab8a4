use super::envelope::{FailureKind, ResultEnvelope};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads above this size are refused rather than loaded.
const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Expand a leading `~` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

pub(super) fn not_found(path: &Path) -> ResultEnvelope {
    ResultEnvelope::error(FailureKind::NotFound)
        .with_field("error", format!("file not found: {}", path.display()))
}

fn io_error(path: &Path, err: &std::io::Error) -> ResultEnvelope {
    ResultEnvelope::error(FailureKind::Io).with_field("error", format!("{}: {err}", path.display()))
}

/// Read a UTF-8 text file into the `content` field.
pub(super) async fn read_text(path: &Path) -> Result<String, ResultEnvelope> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > MAX_READ_BYTES => {
            return Err(ResultEnvelope::error(FailureKind::Io).with_field(
                "error",
                format!(
                    "{} is {} bytes; refusing to read more than {MAX_READ_BYTES}",
                    path.display(),
                    meta.len()
                ),
            ));
        }
        Ok(meta) if meta.is_dir() => {
            return Err(ResultEnvelope::error(FailureKind::Io)
                .with_field("error", format!("{} is a directory", path.display())));
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(path)),
        Err(e) => return Err(io_error(path, &e)),
    }

    tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            not_found(path)
        } else {
            io_error(path, &e)
        }
    })
}

pub(super) async fn read_path(path: &Path) -> ResultEnvelope {
    match read_text(path).await {
        Ok(content) => ResultEnvelope::success().with_field("content", content),
        Err(envelope) => envelope,
    }
}

pub(super) async fn write_path(path: &Path, content: &str) -> ResultEnvelope {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            return io_error(parent, &e);
        }
    }
    match tokio::fs::write(path, content).await {
        Ok(()) => {
            tracing::info!(path = %path.display(), bytes = content.len(), "wrote file");
            ResultEnvelope::success()
                .with_field("status", "success")
                .with_field("path", path.display().to_string())
        }
        Err(e) => io_error(path, &e),
    }
}
