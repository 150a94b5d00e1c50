//! Presenter that only resolves and reports, used by `rainpaper simulate`.

use std::collections::BTreeSet;

use super::{AssetResolver, PresentError, WallpaperPresenter};

/// Accepts every wallpaper; names without a video are noted once each.
pub struct DryRunPresenter {
    assets: AssetResolver,
    /// Distinct names that had no video, at most sixteen
    missing: BTreeSet<String>,
}

impl DryRunPresenter {
    pub fn new(assets: AssetResolver) -> Self {
        Self {
            assets,
            missing: BTreeSet::new(),
        }
    }

    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }
}

impl WallpaperPresenter for DryRunPresenter {
    fn present(&mut self, name: &str) -> Result<(), PresentError> {
        if self.assets.locate(name).is_err() && self.missing.insert(name.to_string()) {
            log_indented!("(no video for {name}, continuing)");
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if !self.missing.is_empty() {
            let names: Vec<&str> = self.missing().collect();
            log_decorated!("Wallpapers without a video: {}", names.join(", "));
        }
    }

    fn kind(&self) -> &'static str {
        "dry-run"
    }
}
