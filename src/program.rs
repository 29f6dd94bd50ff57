use std::path::{Path, PathBuf};

/// Metadata about the loaded ROM, fixed at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    /// Display name: the file stem for ROMs loaded from disk
    pub name: String,
    /// Length in bytes
    pub size: usize,
    /// Where the ROM was read from, if it came from a file
    pub path: Option<PathBuf>,
}

impl ProgramInfo {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        ProgramInfo {
            name: name.into(),
            size,
            path: None,
        }
    }

    /// Names the program after the file it was read from.
    pub fn from_path(path: &Path, size: usize) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        ProgramInfo {
            name,
            size,
            path: Some(path.to_path_buf()),
        }
    }
}
