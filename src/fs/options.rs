//! Settings for opening a [`SafeFile`](super::SafeFile).

/// Permission bits used when no mode is given.
pub const DEFAULT_MODE: u32 = 0o644;

/// Upper bound on attempts to find an unused temporary name.
pub const DEFAULT_CREATE_ATTEMPTS: u32 = 16;

/// Options controlling how a transactional file is created and committed.
///
/// ```
/// # use safeio::fs::Options;
/// let opts = Options::new(0o600).sync_on_commit(false);
/// assert_eq!(opts.mode(), 0o600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    mode: u32,
    sync_on_commit: bool,
    sync_parent_dir: bool,
    create_attempts: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: DEFAULT_MODE,
            sync_on_commit: true,
            sync_parent_dir: true,
            create_attempts: DEFAULT_CREATE_ATTEMPTS,
        }
    }
}

impl Options {
    /// Default options with the given permission bits.
    pub fn new(mode: u32) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Permission bits applied to the temporary file, and so to the destination.
    ///
    /// Passed through unchanged on Unix; ignored elsewhere.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Whether commit calls `sync_all` on the temporary file before renaming.
    pub fn sync_on_commit(mut self, enabled: bool) -> Self {
        self.sync_on_commit = enabled;
        self
    }

    /// Whether commit fsyncs the destination directory after renaming (Unix only).
    ///
    /// Failures here are logged and ignored: the rename already happened.
    pub fn sync_parent_dir(mut self, enabled: bool) -> Self {
        self.sync_parent_dir = enabled;
        self
    }

    /// Number of temporary names tried before open gives up.
    ///
    /// Zero is treated as one.
    pub fn create_attempts(mut self, attempts: u32) -> Self {
        self.create_attempts = attempts;
        self
    }

    pub(crate) fn syncs_on_commit(&self) -> bool {
        self.sync_on_commit
    }

    pub(crate) fn syncs_parent_dir(&self) -> bool {
        self.sync_parent_dir
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.create_attempts.max(1)
    }
}
