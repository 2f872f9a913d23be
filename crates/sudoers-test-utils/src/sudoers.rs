//! [`TestSudoers`] fixture: a temporary `sudoers.d` directory.

use std::fs;
use std::path::PathBuf;

use sudoers_fs::NormalizedPath;
use tempfile::TempDir;

/// File name used for the drop-in inside the temporary directory.
pub const DROP_IN_NAME: &str = "90-cloud-init-users";

/// A temporary directory holding a (possibly absent) sudoers drop-in.
///
/// # Example
///
/// ```rust
/// use sudoers_test_utils::TestSudoers;
///
/// let sudoers = TestSudoers::new();
/// assert!(!sudoers.exists());
/// sudoers.write("# existing\n");
/// assert_eq!(sudoers.read(), "# existing\n");
/// ```
pub struct TestSudoers {
    temp_dir: TempDir,
}

impl Default for TestSudoers {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSudoers {
    /// Create an empty temporary directory; the drop-in does not exist yet.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Native path of the drop-in.
    pub fn native_path(&self) -> PathBuf {
        self.temp_dir.path().join(DROP_IN_NAME)
    }

    /// Normalized path of the drop-in.
    pub fn path(&self) -> NormalizedPath {
        NormalizedPath::new(self.native_path())
    }

    pub fn exists(&self) -> bool {
        self.native_path().exists()
    }

    /// Seed the drop-in with `content`, replacing anything already there.
    ///
    /// # Panics
    /// Panics if the file cannot be written.
    pub fn write(&self, content: &str) {
        fs::write(self.native_path(), content)
            .unwrap_or_else(|e| panic!("TestSudoers::write: {e}"));
    }

    /// Read the drop-in back.
    ///
    /// # Panics
    /// Panics if the file is missing or unreadable.
    pub fn read(&self) -> String {
        fs::read_to_string(self.native_path())
            .unwrap_or_else(|e| panic!("TestSudoers::read: {e}"))
    }

    /// Permission bits of the drop-in.
    ///
    /// # Panics
    /// Panics if the file is missing.
    #[cfg(unix)]
    pub fn mode(&self) -> u32 {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(self.native_path())
            .unwrap_or_else(|e| panic!("TestSudoers::mode: {e}"))
            .permissions()
            .mode()
            & 0o777
    }
}
