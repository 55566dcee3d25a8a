//! Locates the history and bookmark files of Chromium-family browsers.
//!
//! Defines:
//! - `Browser` enum with variants for supported browsers
//! - `BrowserPaths` struct holding optional history/bookmarks paths
//! - `browser_paths` resolving a browser profile to existing files

use std::path::PathBuf;

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    ChromeBeta,
    Brave,
    BraveBeta,
    Edge,
    Opera,
    Vivaldi,
    Arc,
    Chromium,
    Sidekick,
}

const ALL: [Browser; 10] = [
    Browser::Chrome,
    Browser::ChromeBeta,
    Browser::Brave,
    Browser::BraveBeta,
    Browser::Edge,
    Browser::Opera,
    Browser::Vivaldi,
    Browser::Arc,
    Browser::Chromium,
    Browser::Sidekick,
];

impl Browser {
    /// Get the display name of the browser
    pub fn name(&self) -> &'static str {
        match self {
            Browser::Chrome => "Google Chrome",
            Browser::ChromeBeta => "Google Chrome Beta",
            Browser::Brave => "Brave",
            Browser::BraveBeta => "Brave Beta",
            Browser::Edge => "Microsoft Edge",
            Browser::Opera => "Opera",
            Browser::Vivaldi => "Vivaldi",
            Browser::Arc => "Arc",
            Browser::Chromium => "Chromium",
            Browser::Sidekick => "Sidekick",
        }
    }

    /// Name used to pick the browser through the `browser` variable
    pub fn env_var(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::ChromeBeta => "chrome_beta",
            Browser::Brave => "brave",
            Browser::BraveBeta => "brave_beta",
            Browser::Edge => "edge",
            Browser::Opera => "opera",
            Browser::Vivaldi => "vivaldi",
            Browser::Arc => "arc",
            Browser::Chromium => "chromium",
            Browser::Sidekick => "sidekick",
        }
    }

    pub fn from_env_name(name: &str) -> Option<Browser> {
        let name = name.trim();
        ALL.into_iter()
            .find(|b| b.env_var().eq_ignore_ascii_case(name))
    }

    /// User-data directory relative to the platform config dir.
    #[cfg(target_os = "macos")]
    fn user_data_dir(&self) -> Option<&'static str> {
        Some(match self {
            Browser::Chrome => "Google/Chrome",
            Browser::ChromeBeta => "Google/Chrome Beta",
            Browser::Brave => "BraveSoftware/Brave-Browser",
            Browser::BraveBeta => "BraveSoftware/Brave-Browser-Beta",
            Browser::Edge => "Microsoft Edge",
            Browser::Opera => "com.operasoftware.Opera",
            Browser::Vivaldi => "Vivaldi",
            Browser::Arc => "Arc/User Data",
            Browser::Chromium => "Chromium",
            Browser::Sidekick => "Sidekick",
        })
    }

    #[cfg(not(target_os = "macos"))]
    fn user_data_dir(&self) -> Option<&'static str> {
        match self {
            Browser::Chrome => Some("google-chrome"),
            Browser::ChromeBeta => Some("google-chrome-beta"),
            Browser::Brave => Some("BraveSoftware/Brave-Browser"),
            Browser::BraveBeta => Some("BraveSoftware/Brave-Browser-Beta"),
            Browser::Edge => Some("microsoft-edge"),
            Browser::Opera => Some("opera"),
            Browser::Vivaldi => Some("vivaldi"),
            Browser::Chromium => Some("chromium"),
            Browser::Arc | Browser::Sidekick => None,
        }
    }

    /// Opera keeps its profile directly in the user-data directory.
    fn has_profiles(&self) -> bool {
        !matches!(self, Browser::Opera)
    }
}

/// Represents paths to browser data files
#[derive(Debug, Default)]
pub struct BrowserPaths {
    pub history: Option<PathBuf>,
    pub bookmarks: Option<PathBuf>,
}

/// Resolve the data files of `browser` for `profile`. Missing files are `None`.
pub fn browser_paths(browser: Browser, profile: &str) -> BrowserPaths {
    let Some(config) = dirs::config_dir() else {
        return BrowserPaths::default();
    };
    let Some(user_data) = browser.user_data_dir() else {
        log::debug!("{} is not available on this platform", browser.name());
        return BrowserPaths::default();
    };

    let mut profile_dir = config.join(user_data);
    if browser.has_profiles() {
        profile_dir.push(profile);
    }

    let existing = |name: &str| Some(profile_dir.join(name)).filter(|p| p.is_file());

    BrowserPaths {
        history: existing("History"),
        bookmarks: existing("Bookmarks"),
    }
}
