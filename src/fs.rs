//! Filesystem primitives the transfer engine is built on.
//!
//! The engine never touches the filesystem directly. Everything goes through
//! [`FileSystem`], which keeps the compensation logic independent of how
//! files are opened, streamed and removed. [`LocalFs`] is the real
//! implementation backed by `tokio::fs`.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite};

/// The filesystem operations a transfer consumes.
///
/// Implementations must be stateless with respect to individual transfers:
/// one instance may serve any number of concurrent requests.
pub trait FileSystem: Send + Sync {
    /// Readable stream returned by [`FileSystem::open_read`].
    type Reader: AsyncRead + Unpin + Send;
    /// Writable stream returned by [`FileSystem::create_new`].
    type Writer: AsyncWrite + Unpin + Send;

    /// Open `path` for sequential reading, allowing other readers.
    ///
    /// Fails with [`io::ErrorKind::IsADirectory`] if `path` is a directory.
    fn open_read(&self, path: &Path) -> impl Future<Output = io::Result<Self::Reader>> + Send;

    /// Create `path` for writing, failing with
    /// [`io::ErrorKind::AlreadyExists`] if anything is already there.
    fn create_new(&self, path: &Path) -> impl Future<Output = io::Result<Self::Writer>> + Send;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send;

    /// Remove the file at `path`.
    fn remove_file(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    /// Flush file contents and metadata of `writer` to durable storage.
    fn sync(&self, writer: &mut Self::Writer) -> impl Future<Output = io::Result<()>> + Send;

    /// Release `writer` once no operation on it is still running.
    ///
    /// Dropping a writer is not enough: a write already handed to another
    /// thread keeps the file open until it finishes, and on Windows an open
    /// file cannot be removed.
    fn close(&self, writer: Self::Writer) -> impl Future<Output = ()> + Send;
}

/// The local filesystem, via `tokio::fs`.
///
/// Blocking calls (open, remove, sync) run on tokio's blocking pool and are
/// awaited, so they never stall the cooperative scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    type Reader = File;
    type Writer = File;

    async fn open_read(&self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true);
        #[cfg(windows)]
        options.share_mode(windows::Win32::Storage::FileSystem::FILE_SHARE_READ.0);

        let file = options.open(native_path(path)).await?;
        if file.metadata().await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "source is a directory",
            ));
        }
        Ok(file)
    }

    async fn create_new(&self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(windows)]
        options.share_mode(0);

        options.open(native_path(path)).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(native_path(path)).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(native_path(path)).await
    }

    async fn sync(&self, writer: &mut File) -> io::Result<()> {
        writer.sync_all().await
    }

    async fn close(&self, writer: File) {
        // Waits for the in-flight blocking operation, if any
        drop(writer.into_std().await);
    }
}

/// Convert `path` into the form the OS accepts for arbitrarily long paths.
///
/// On Windows this is the `\\?\` extended-length form (`\\?\UNC\` for shares),
/// which lifts the 260 character `MAX_PATH` limit. Elsewhere the path is
/// returned unchanged.
#[cfg(windows)]
pub(crate) fn native_path(path: &Path) -> PathBuf {
    let raw = path.as_os_str().to_string_lossy();
    if raw.starts_with(r"\\?\") {
        return path.to_path_buf();
    }
    if let Some(share) = raw.strip_prefix(r"\\") {
        return PathBuf::from(format!(r"\\?\UNC\{share}"));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    PathBuf::from(format!(r"\\?\{}", absolute.display()))
}

#[cfg(not(windows))]
pub(crate) fn native_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}
