use std::{
    fs::{File, Permissions},
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use tokio::{fs::read_to_string, task::spawn_blocking};
use tracing::error;

use crate::result::{UpdaterError, UpdaterResult};

/**
    Reads the file at the given path to a string.

    Will return [`UpdaterError::FileNotFound`] if the file does not exist.
*/
pub(crate) async fn load_string_from_file(path: impl AsRef<Path>) -> UpdaterResult<String> {
    let path = path.as_ref();
    match read_to_string(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(UpdaterError::FileNotFound(path.into()))
        }
        Err(e) => Err(e.into()),
        Ok(s) => Ok(s),
    }
}

/**
    Replaces the contents of the file at the given path.

    The contents are first written to a temporary file in the same
    directory, which is then renamed over the target. Readers will
    see either the old or the new contents, never a partial write.
*/
pub(crate) async fn save_to_file_atomic(
    path: impl AsRef<Path>,
    contents: String,
) -> UpdaterResult<()> {
    let path = path.as_ref().to_path_buf();
    let target = path.clone();

    let res = spawn_blocking(move || write_and_persist(&target, contents.as_bytes())).await?;
    if let Err(e) = res {
        error!("Failed to write file at {path:?}:\n{e}");
        return Err(UpdaterError::ManifestWrite { path, source: e });
    }

    Ok(())
}

fn write_and_persist(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;

    // Temp files are created owner-only
    let permissions = target_permissions(path, file.as_file())?;
    file.as_file().set_permissions(permissions)?;

    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

fn target_permissions(path: &Path, temp: &File) -> io::Result<Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => new_file_permissions(temp),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn new_file_permissions(_temp: &File) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions(temp: &File) -> io::Result<Permissions> {
    Ok(temp.metadata()?.permissions())
}
