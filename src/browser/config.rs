use std::path::PathBuf;

/// Options for launching Chrome
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window (default: true)
    pub headless: bool,

    /// Browser window width in pixels
    pub window_width: u32,

    /// Browser window height in pixels
    pub window_height: u32,

    /// Chrome executable; `None` lets headless_chrome look it up
    pub chrome_path: Option<PathBuf>,

    /// Directory holding the named profiles; `None` means `~/.web-chrome/profiles`
    pub profile_root: Option<PathBuf>,

    /// Keep Chrome's sandbox enabled (default: true)
    pub sandbox: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            chrome_path: None,
            profile_root: None,
            sandbox: true,
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = Some(root.into());
        self
    }

    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}
