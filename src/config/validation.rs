//! Configuration validation.
//!
//! Rejects values that cannot work (hours past 23, volumes outside 0-1, empty
//! ranges the wrong way round). Thresholds that are merely out of order are
//! accepted with a warning; the classifier still picks exactly one window.

use anyhow::Result;

use super::{Config, DisplayMode};
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    validate_timing(config)?;
    validate_audio(config)?;
    validate_debug(config)?;
    validate_display(config)?;

    if !config.thresholds().is_ordered() {
        log_warning!(
            "Time window thresholds are not in morning < day < evening < night order; \
             earlier windows take precedence where they overlap"
        );
    }

    Ok(())
}

fn validate_timing(config: &Config) -> Result<()> {
    let t = &config.timing;

    for (name, hour) in [
        ("morning_start", t.morning_start),
        ("day_start", t.day_start),
        ("evening_start", t.evening_start),
        ("night_start", t.night_start),
    ] {
        if hour > MAXIMUM_HOUR {
            anyhow::bail!("{name} ({hour}) must be an hour between 0 and {MAXIMUM_HOUR}");
        }
    }

    if t.min_rain_duration > t.max_rain_duration {
        anyhow::bail!(
            "min_rain_duration ({}) must not exceed max_rain_duration ({})",
            t.min_rain_duration,
            t.max_rain_duration
        );
    }

    if t.min_clear_duration > t.max_clear_duration {
        anyhow::bail!(
            "min_clear_duration ({}) must not exceed max_clear_duration ({})",
            t.min_clear_duration,
            t.max_clear_duration
        );
    }

    Ok(())
}

fn validate_volume(name: &str, volume: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&volume) {
        anyhow::bail!("{name} ({volume}) must be between 0.0 and 1.0");
    }
    Ok(())
}

fn validate_audio(config: &Config) -> Result<()> {
    let a = &config.audio;

    validate_volume("background_volume", a.background_volume)?;
    validate_volume("music_volume", a.music_volume)?;
    validate_volume("rain_fade_ceiling", a.rain_fade_ceiling)?;

    if !(MINIMUM_FADE_STEPS..=MAXIMUM_FADE_STEPS).contains(&a.rain_fade_steps) {
        anyhow::bail!(
            "rain_fade_steps ({}) must be between {} and {}",
            a.rain_fade_steps,
            MINIMUM_FADE_STEPS,
            MAXIMUM_FADE_STEPS
        );
    }

    if !(a.rain_fade_delay > 0.0 && a.rain_fade_delay <= MAXIMUM_FADE_DELAY) {
        anyhow::bail!(
            "rain_fade_delay ({}) must be greater than 0 and at most {} seconds",
            a.rain_fade_delay,
            MAXIMUM_FADE_DELAY
        );
    }

    Ok(())
}

fn validate_debug(config: &Config) -> Result<()> {
    let interval = config.debug.status_update_interval;
    if !(MINIMUM_STATUS_INTERVAL..=MAXIMUM_STATUS_INTERVAL).contains(&interval) {
        anyhow::bail!(
            "status_update_interval ({interval}) must be between {MINIMUM_STATUS_INTERVAL} and {MAXIMUM_STATUS_INTERVAL} seconds"
        );
    }
    Ok(())
}

fn validate_display(config: &Config) -> Result<()> {
    let d = &config.display;

    if d.video_extension.trim_start_matches('.').is_empty() {
        anyhow::bail!("video_extension must not be empty");
    }

    if !(MINIMUM_STATUS_INTERVAL..=MAXIMUM_STATUS_INTERVAL).contains(&d.status_check_interval) {
        anyhow::bail!(
            "status_check_interval ({}) must be between {} and {} seconds",
            d.status_check_interval,
            MINIMUM_STATUS_INTERVAL,
            MAXIMUM_STATUS_INTERVAL
        );
    }

    if d.settle_ms > MAXIMUM_SETTLE_MS {
        anyhow::bail!(
            "settle_ms ({}) must be at most {} milliseconds",
            d.settle_ms,
            MAXIMUM_SETTLE_MS
        );
    }

    if d.close_timeout == 0 || d.show_timeout == 0 {
        anyhow::bail!("close_timeout and show_timeout must be at least 1 second");
    }

    if d.mode == DisplayMode::Host {
        if d.show_args.is_empty() {
            anyhow::bail!("show_args must not be empty in host mode");
        }
        if !d.show_args.iter().any(|arg| arg.contains(FILE_PLACEHOLDER)) {
            anyhow::bail!("show_args must contain the {FILE_PLACEHOLDER} placeholder");
        }
    }

    Ok(())
}
