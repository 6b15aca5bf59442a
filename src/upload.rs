//! Upload storage
//!
//! Every request gets its own [`Workspace`], a temp directory under the
//! [`UploadRoot`]. The workspace holds the uploaded image and the
//! intermediate MIDI file and is deleted when dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Name used when nothing survives sanitization
pub const FALLBACK_FILENAME: &str = "upload";

/// Name of the intermediate MIDI file inside a workspace
pub const TRACK_FILENAME: &str = "track.mid";

/// A file received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Upload {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component
///
/// Accented letters are decomposed down to their ASCII base, path
/// separators and whitespace runs become `_`, anything outside ASCII
/// letters, digits, `_`, `.` and `-` is dropped, and leading or trailing
/// dots and underscores are trimmed.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory holding all request workspaces
#[derive(Debug)]
pub struct UploadRoot {
    path: PathBuf,
    // Set when the directory was created by this process; dropping it removes the tree
    owned: Option<TempDir>,
}

impl UploadRoot {
    /// Use `dir` (created if missing) or a fresh temp directory
    pub fn create(dir: Option<&Path>) -> io::Result<Self> {
        match dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(UploadRoot {
                    path: dir.to_path_buf(),
                    owned: None,
                })
            }
            None => {
                let owned = tempfile::Builder::new().prefix("sheet2tab-").tempdir()?;
                Ok(UploadRoot {
                    path: owned.path().to_path_buf(),
                    owned: Some(owned),
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    pub fn workspace(&self) -> io::Result<Workspace> {
        let dir = tempfile::Builder::new()
            .prefix("request-")
            .tempdir_in(&self.path)?;
        debug!(workspace = %dir.path().display(), "created request workspace");
        Ok(Workspace { dir })
    }
}

/// Scratch directory for a single conversion
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the upload under its sanitized name and return the full path
    pub fn save(&self, upload: &Upload) -> io::Result<PathBuf> {
        let mut name = secure_filename(&upload.filename);
        if name == TRACK_FILENAME {
            name = format!("{}_{}", FALLBACK_FILENAME, name);
        }
        let path = self.dir.path().join(name);
        fs::write(&path, &upload.bytes)?;
        Ok(path)
    }

    pub fn track_path(&self) -> PathBuf {
        self.dir.path().join(TRACK_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("score.png"), "score.png");
        assert_eq!(secure_filename("My Sheet Music.png"), "My_Sheet_Music.png");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\scans\\page 1.jpg"), "C_scans_page_1.jpg");
        assert_eq!(secure_filename(".hidden"), "hidden");
        assert_eq!(secure_filename("partition-é.png"), "partition-e.png");
        assert_eq!(secure_filename("Für Elise – Ñandú.png"), "Fur_Elise_Nandu.png");
    }

    #[test]
    fn test_secure_filename_fallback() {
        assert_eq!(secure_filename(""), FALLBACK_FILENAME);
        assert_eq!(secure_filename("..."), FALLBACK_FILENAME);
        assert_eq!(secure_filename("日本語"), FALLBACK_FILENAME);
    }

    #[test]
    fn test_workspace_is_removed_on_drop() {
        let parent = TempDir::new().unwrap();
        let root = UploadRoot::create(Some(parent.path())).unwrap();
        assert!(!root.is_owned());

        let workspace = root.workspace().unwrap();
        let saved = workspace
            .save(&Upload::new("sheet.png", vec![1u8, 2, 3]))
            .unwrap();
        assert_eq!(saved.file_name().unwrap(), "sheet.png");
        assert_eq!(fs::read(&saved).unwrap(), vec![1, 2, 3]);

        let dir = workspace.path().to_path_buf();
        drop(workspace);
        assert!(!dir.exists());
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_upload_never_shadows_track() {
        let root = UploadRoot::create(None).unwrap();
        let workspace = root.workspace().unwrap();
        let saved = workspace.save(&Upload::new("track.mid", vec![0u8])).unwrap();
        assert_ne!(saved, workspace.track_path());
    }

    #[test]
    fn test_owned_root_is_removed_on_drop() {
        let root = UploadRoot::create(None).unwrap();
        assert!(root.is_owned());
        let path = root.path().to_path_buf();
        assert!(path.is_dir());

        drop(root);
        assert!(!path.exists());
    }

    proptest! {
        #[test]
        fn prop_secure_filename_is_one_safe_component(name in ".{0,40}") {
            let safe = secure_filename(&name);
            prop_assert!(!safe.is_empty());
            prop_assert!(safe
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')));
            prop_assert!(!safe.starts_with('.') && !safe.starts_with('_'));
            prop_assert_ne!(safe.as_str(), "..");
        }
    }
}
