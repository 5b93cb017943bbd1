// src/engine/io.rs
//
// I/O operations: reading the source, atomic writes, verbatim copies and
// content sniffing for the target format.

use crate::engine::common::EngineResult;
use crate::error::WebpreError;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Bytes inspected when sniffing content, same as the web sniffing algorithm.
pub const SNIFF_LEN: usize = 512;

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

pub fn read_file(path: &Path) -> EngineResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WebpreError::file_not_found(display(path)),
        _ => WebpreError::file_read_failed(display(path), e),
    })
}

pub fn file_size(path: &Path) -> EngineResult<u64> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => WebpreError::file_not_found(display(path)),
            _ => WebpreError::file_read_failed(display(path), e),
        })
}

/// Write `data` to `path` atomically.
///
/// The bytes go to a temp file in the destination directory (so the rename
/// never crosses file systems), are synced, then persisted over `path`.
/// A failed write leaves any existing destination untouched.
///
/// An existing destination keeps its permissions; a new one gets the usual
/// `0o666` minus the process umask.
pub fn write_file_atomic(path: &Path, data: &[u8]) -> EngineResult<u64> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file =
        create_temp_in(dir).map_err(|e| WebpreError::file_write_failed(display(dir), e))?;
    if let Ok(existing) = std::fs::metadata(path) {
        temp_file
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| WebpreError::file_write_failed(display(temp_file.path()), e))?;
    }
    temp_file
        .write_all(data)
        .map_err(|e| WebpreError::file_write_failed(display(temp_file.path()), e))?;
    temp_file
        .as_file_mut()
        .sync_all()
        .map_err(|e| WebpreError::file_write_failed(display(temp_file.path()), e))?;
    temp_file
        .persist(path)
        .map_err(|e| WebpreError::file_write_failed(display(path), e.error))?;

    tracing::debug!(target: "webpre::io", path = %path.display(), bytes = data.len(), "wrote output");
    Ok(data.len() as u64)
}

// NamedTempFile defaults to 0o600; the open mode below is masked by the umask.
#[cfg(unix)]
fn create_temp_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;
    Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}

/// Copy `from` to `to` byte for byte. Returns the number of bytes copied.
pub fn copy_file(from: &Path, to: &Path) -> EngineResult<u64> {
    let copied = std::fs::copy(from, to)
        .map_err(|e| WebpreError::file_copy_failed(display(from), display(to), e))?;
    tracing::debug!(target: "webpre::io", from = %from.display(), to = %to.display(), bytes = copied, "copied original");
    Ok(copied)
}

/// True when `header` carries the WebP signature: `RIFF`, a 4-byte length,
/// then `WEBPVP`.
pub fn sniff_webp(header: &[u8]) -> bool {
    header.len() >= 14 && &header[0..4] == b"RIFF" && &header[8..14] == b"WEBPVP"
}

/// Read at most `SNIFF_LEN` leading bytes. `None` on any I/O error.
pub fn read_header(path: &Path) -> Option<Vec<u8>> {
    let file = std::fs::File::open(path).ok()?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut header).ok()?;
    Some(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn riff(fourcc: &[u8; 4], chunk: &[u8; 2]) -> Vec<u8> {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&[0x24, 0, 0, 0]);
        data.extend_from_slice(fourcc);
        data.extend_from_slice(chunk);
        data.extend_from_slice(&[0u8; 16]);
        data
    }

    #[test]
    fn test_sniff_webp_signature() {
        assert!(sniff_webp(&riff(b"WEBP", b"VP")));
        assert!(!sniff_webp(&riff(b"WAVE", b"fm")));
        assert!(!sniff_webp(b"RIFF"));
        assert!(!sniff_webp(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_sniff_rejects_webp_without_vp_chunk() {
        assert!(!sniff_webp(&riff(b"WEBP", b"XX")));
    }

    #[test]
    fn test_read_header_on_real_encoder_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.webp");
        let data = webp::Encoder::from_rgb(&[0u8; 4 * 4 * 3], 4, 4)
            .encode(75.0)
            .to_vec();
        std::fs::write(&path, &data).unwrap();

        let header = read_header(&path).unwrap();
        assert_eq!(header.len(), data.len().min(SNIFF_LEN));
        assert!(sniff_webp(&header));
        assert!(read_header(&dir.path().join("missing.webp")).is_none());
    }

    #[test]
    fn test_write_file_atomic_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        assert_eq!(write_file_atomic(&path, b"first").unwrap(), 5);
        assert_eq!(write_file_atomic(&path, b"second!").unwrap(), 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"second!");
        // Only the destination remains, no stray temp files.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_atomic_uses_regular_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        std::fs::write(&plain, b"x").unwrap();
        let path = dir.path().join("out.webp");
        write_file_atomic(&path, b"data").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        // Same mode as any file the process creates normally, not 0o600.
        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_atomic_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.webp");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_file_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o640);
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_file_atomic_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.bin");
        assert!(matches!(
            write_file_atomic(&path, b"x").unwrap_err(),
            WebpreError::FileWriteFailed { .. }
        ));
    }

    #[test]
    fn test_copy_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        std::fs::write(&src, [1u8, 2, 3, 4, 5]).unwrap();
        assert_eq!(copy_file(&src, &dst).unwrap(), 5);
        assert_eq!(read_file(&dst).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(file_size(&dst).unwrap(), 5);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(matches!(
            read_file(&missing).unwrap_err(),
            WebpreError::FileNotFound { .. }
        ));
        assert!(matches!(
            file_size(&missing).unwrap_err(),
            WebpreError::FileNotFound { .. }
        ));
    }
}
