//! Asset mount: a directory or a zip archive, detected the same way
//! `original_source/src/core/fs.c` does (`stat` the path; directory wins,
//! otherwise open it as an archive). User data is always a plain OS
//! directory, since it must be writable and archives are read-only.

use platform::{Filesystem, PlatformError};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

enum Mount {
    Directory(PathBuf),
    Archive(Mutex<zip::ZipArchive<fs::File>>),
}

pub struct MountedFs {
    mount: Mount,
    user_data_root: PathBuf,
}

impl MountedFs {
    pub fn open(mount_path: &Path, user_data_root: PathBuf) -> Result<Self, PlatformError> {
        let metadata = fs::metadata(mount_path).map_err(PlatformError::Io)?;
        let mount = if metadata.is_dir() {
            Mount::Directory(mount_path.to_path_buf())
        } else {
            let file = fs::File::open(mount_path).map_err(PlatformError::Io)?;
            let archive = zip::ZipArchive::new(file)
                .map_err(|e| PlatformError::InitFailed(format!("not a directory or zip archive: {}", e)))?;
            Mount::Archive(Mutex::new(archive))
        };
        fs::create_dir_all(&user_data_root).map_err(PlatformError::Io)?;
        Ok(Self { mount, user_data_root })
    }
}

impl Filesystem for MountedFs {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        match &self.mount {
            Mount::Directory(root) => fs::read(root.join(path)).ok(),
            Mount::Archive(archive) => {
                let mut archive = archive.lock().ok()?;
                let mut entry = archive.by_name(path).ok()?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes).ok()?;
                Some(bytes)
            }
        }
    }

    fn read_user_data(&self, path: &str) -> Option<Vec<u8>> {
        fs::read(self.user_data_root.join(path)).ok()
    }

    fn write_user_data(&self, path: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        let dest = self.user_data_root.join(path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(PlatformError::Io)?;
        }
        fs::write(dest, bytes).map_err(PlatformError::Io)
    }
}
