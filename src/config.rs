//! Workflow configuration, read from environment variables.

use crate::browser::Browser;
use crate::engine::{Sources, MAX_HISTORY_RESULTS};
use crate::utils::{get_env_bool_or, get_env_with_default};

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub browser: Browser,
    pub profile: String,
    pub sources: Sources,
    pub max_history_results: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            browser: Browser::Chrome,
            profile: "Default".to_string(),
            sources: Sources::default(),
            max_history_results: MAX_HISTORY_RESULTS,
        }
    }
}

impl SweepConfig {
    pub fn from_env() -> Self {
        let defaults = SweepConfig::default();

        let browser_name = get_env_with_default("browser", defaults.browser.env_var());
        let browser = Browser::from_env_name(&browser_name).unwrap_or_else(|| {
            log::error!(
                "Unknown browser {:?}, falling back to {}",
                browser_name,
                defaults.browser.name()
            );
            defaults.browser
        });

        let max_history_results = get_env_with_default("max_history_results", "")
            .parse()
            .unwrap_or(defaults.max_history_results);

        SweepConfig {
            browser,
            profile: get_env_with_default("profile", &defaults.profile),
            sources: Sources {
                history: get_env_bool_or("include_history", true),
                bookmarks: get_env_bool_or("include_bookmarks", true),
            },
            max_history_results,
        }
    }
}
