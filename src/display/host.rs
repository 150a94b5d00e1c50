//! External wallpaper host.
//!
//! The host process renders the video; we only tell it what to show through
//! its command-line tool. Each present is a two-step exchange:
//!
//! 1. **close** every wallpaper on every monitor (`closewp --monitor -1`)
//! 2. wait for the host to settle
//! 3. **show** the new file (`setwp --file <path>`)
//!
//! Both steps are subprocesses with their own timeout. Their outcome is judged
//! solely by exit status and timeout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::{AssetResolver, PresentError, WallpaperPresenter};
use crate::common::constants::FILE_PLACEHOLDER;
use crate::config::Config;
use crate::core::stop::StopSignal;
use crate::io::process::{CommandOutcome, run_with_timeout};
use crate::time::TimeSource;

/// The two operations a wallpaper host supports.
#[cfg_attr(test, mockall::automock)]
pub trait PresentCapability: Send {
    /// Tear down every wallpaper the host is showing.
    fn close(&mut self) -> CommandOutcome;

    /// Show the video at `path`.
    fn show(&mut self, path: &Path) -> CommandOutcome;
}

/// Capability backed by the host's command-line tool.
pub struct HostTool {
    program: String,
    close_args: Vec<String>,
    show_args: Vec<String>,
    close_timeout: Duration,
    show_timeout: Duration,
}

impl HostTool {
    pub fn from_config(config: &Config) -> Self {
        Self {
            program: config.paths.host_tool.clone(),
            close_args: config.display.close_args.clone(),
            show_args: config.display.show_args.clone(),
            close_timeout: Duration::from_secs(config.display.close_timeout),
            show_timeout: Duration::from_secs(config.display.show_timeout),
        }
    }

    /// True when the program exists as a path or can be found on `PATH`.
    pub fn is_available(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false)
    }

    fn show_args_for(&self, path: &Path) -> Vec<String> {
        let file = path.to_string_lossy();
        self.show_args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &file))
            .collect()
    }
}

impl PresentCapability for HostTool {
    fn close(&mut self) -> CommandOutcome {
        run_with_timeout(&self.program, &self.close_args, self.close_timeout)
    }

    fn show(&mut self, path: &Path) -> CommandOutcome {
        let args = self.show_args_for(path);
        run_with_timeout(&self.program, &args, self.show_timeout)
    }
}

/// Presenter that delegates rendering to an external host.
///
/// Presenting the name already on screen is a no-op.
pub struct ExternalHostPresenter<C: PresentCapability> {
    capability: C,
    assets: AssetResolver,
    settle: Duration,
    stop: StopSignal,
    time: Arc<dyn TimeSource>,
    current: Option<String>,
}

impl<C: PresentCapability> ExternalHostPresenter<C> {
    pub fn new(
        capability: C,
        assets: AssetResolver,
        settle: Duration,
        stop: StopSignal,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            capability,
            assets,
            settle,
            stop,
            time,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl<C: PresentCapability> WallpaperPresenter for ExternalHostPresenter<C> {
    fn present(&mut self, name: &str) -> Result<(), PresentError> {
        if self.current.as_deref() == Some(name) {
            log_debug!("{name} already showing, skipping host call");
            return Ok(());
        }

        let path = self.assets.locate(name)?;

        let outcome = self.capability.close();
        if !outcome.is_success() {
            return Err(PresentError::Command {
                step: "close",
                outcome,
            });
        }
        // Nothing is on screen from here until show succeeds
        self.current = None;

        // A stop during the settle skips show; teardown closes the host anyway
        if !self.stop.sleep(self.settle, self.time.as_ref()) {
            return Err(PresentError::Interrupted);
        }

        let outcome = self.capability.show(&path);
        if !outcome.is_success() {
            return Err(PresentError::Command {
                step: "show",
                outcome,
            });
        }

        self.current = Some(name.to_string());
        Ok(())
    }

    fn teardown(&mut self) {
        match self.capability.close() {
            CommandOutcome::Success => log_decorated!("Closed all wallpapers"),
            outcome => log_error!("Error closing wallpaper: close {outcome}"),
        }
        self.current = None;
    }

    fn kind(&self) -> &'static str {
        "host"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::source::SteppedTimeSource;
    use mockall::Sequence;
    use tempfile::{TempDir, tempdir};

    fn assets_with(names: &[&str]) -> (TempDir, AssetResolver) {
        let dir = tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(format!("{name}.mov")), b"").unwrap();
        }
        let resolver = AssetResolver::new(dir.path(), "mov");
        (dir, resolver)
    }

    fn presenter(
        mock: MockPresentCapability,
        assets: AssetResolver,
    ) -> (ExternalHostPresenter<MockPresentCapability>, Arc<SteppedTimeSource>) {
        let time = Arc::new(SteppedTimeSource::at_hour(18));
        let presenter = ExternalHostPresenter::new(
            mock,
            assets,
            Duration::from_secs(1),
            StopSignal::new(),
            time.clone(),
        );
        (presenter, time)
    }

    /// Clock that lowers the stop flag on its first sleep.
    struct StopOnSleep {
        inner: SteppedTimeSource,
        stop: StopSignal,
    }

    impl TimeSource for StopOnSleep {
        fn now(&self) -> chrono::DateTime<chrono::Local> {
            self.inner.now()
        }
        fn sleep(&self, duration: Duration) {
            self.inner.sleep(duration);
            self.stop.stop();
        }
        fn is_simulated(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_long_settle_is_cut_short_by_stop() {
        let (_dir, assets) = assets_with(&["night_rain"]);
        let mut mock = MockPresentCapability::new();
        mock.expect_close().times(1).return_const(CommandOutcome::Success);
        mock.expect_show().never();

        let stop = StopSignal::new();
        let time = Arc::new(StopOnSleep {
            inner: SteppedTimeSource::at_hour(22),
            stop: stop.clone(),
        });
        let mut presenter = ExternalHostPresenter::new(
            mock,
            assets,
            Duration::from_secs(60),
            stop,
            time.clone(),
        );

        assert_eq!(presenter.present("night_rain"), Err(PresentError::Interrupted));
        assert_eq!(presenter.current(), None);
        // One chunk of the minute-long settle ran before the stop was seen
        assert_eq!(time.inner.total_slept(), Duration::from_secs(1));
    }

    #[test]
    fn test_present_closes_settles_then_shows() {
        let (_dir, assets) = assets_with(&["evening"]);
        let mut mock = MockPresentCapability::new();
        let mut seq = Sequence::new();
        mock.expect_close()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(CommandOutcome::Success);
        mock.expect_show()
            .withf(|path| path.ends_with("evening.mov"))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(CommandOutcome::Success);

        let (mut presenter, time) = presenter(mock, assets);
        assert!(presenter.present("evening").is_ok());
        assert_eq!(presenter.current(), Some("evening"));
        assert_eq!(time.total_slept(), Duration::from_secs(1));
    }

    #[test]
    fn test_same_name_twice_is_noop() {
        let (_dir, assets) = assets_with(&["night"]);
        let mut mock = MockPresentCapability::new();
        mock.expect_close().times(1).return_const(CommandOutcome::Success);
        mock.expect_show().times(1).return_const(CommandOutcome::Success);

        let (mut presenter, _time) = presenter(mock, assets);
        assert!(presenter.present("night").is_ok());
        assert!(presenter.present("night").is_ok());
    }

    #[test]
    fn test_missing_asset_has_no_side_effects() {
        let (_dir, assets) = assets_with(&[]);
        let mut mock = MockPresentCapability::new();
        mock.expect_close().never();
        mock.expect_show().never();

        let (mut presenter, time) = presenter(mock, assets);
        assert!(matches!(
            presenter.present("day_rain"),
            Err(PresentError::MissingAsset(_))
        ));
        assert_eq!(time.total_slept(), Duration::ZERO);
    }

    #[test]
    fn test_close_timeout_fails_without_show() {
        let (_dir, assets) = assets_with(&["day"]);
        let mut mock = MockPresentCapability::new();
        mock.expect_close().times(1).return_const(CommandOutcome::Timeout);
        mock.expect_show().never();

        let (mut presenter, _time) = presenter(mock, assets);
        assert_eq!(
            presenter.present("day"),
            Err(PresentError::Command {
                step: "close",
                outcome: CommandOutcome::Timeout
            })
        );
    }

    #[test]
    fn test_show_failure_allows_retry() {
        let (_dir, assets) = assets_with(&["morning"]);
        let mut mock = MockPresentCapability::new();
        mock.expect_close().times(2).return_const(CommandOutcome::Success);
        let mut seq = Sequence::new();
        mock.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(CommandOutcome::ProcessError(2));
        mock.expect_show()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(CommandOutcome::Success);

        let (mut presenter, _time) = presenter(mock, assets);
        assert!(presenter.present("morning").is_err());
        assert_eq!(presenter.current(), None);
        assert!(presenter.present("morning").is_ok());
        assert_eq!(presenter.current(), Some("morning"));
    }

    #[test]
    fn test_show_args_substitute_file() {
        let tool = HostTool {
            program: "livelycu".into(),
            close_args: vec!["closewp".into()],
            show_args: vec!["setwp".into(), "--file".into(), "{file}".into()],
            close_timeout: Duration::from_secs(10),
            show_timeout: Duration::from_secs(15),
        };
        assert_eq!(
            tool.show_args_for(Path::new("/w/day.mov")),
            ["setwp", "--file", "/w/day.mov"]
        );
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let tool = HostTool {
            program: "/nonexistent/livelycu".into(),
            close_args: Vec::new(),
            show_args: Vec::new(),
            close_timeout: Duration::from_secs(1),
            show_timeout: Duration::from_secs(1),
        };
        assert!(!tool.is_available());
    }
}
