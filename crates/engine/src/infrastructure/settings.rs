//! Engine settings loaded from the environment.
//!
//! Every value has a default so a bare `luckydraw-engine` starts a show with
//! the usual stage layout. `.env` files are loaded by `main` before this runs.

use std::path::PathBuf;
use std::time::Duration;

use luckydraw_domain::{CardSize, Viewport, DEFAULT_SPHERE_RADIUS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Transition durations and spin rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSettings {
    /// Nominal grid/sphere transition; each card takes between 1x and 2x this.
    pub formation_ms: u64,
    /// Boot fly-in into the grid
    pub boot_ms: u64,
    /// Winner flight to the podium
    pub reveal_position_ms: u64,
    pub reveal_rotation_ms: u64,
    /// Existing cards redistributing after a sphere merge
    pub merge_retarget_ms: u64,
    /// Grid shuffle after a merge while on the table
    pub merge_grid_ms: u64,
    /// Back-to-table burst outwards, then converge on the grid
    pub burst_ms: u64,
    pub converge_ms: u64,
    pub stagger_groups: usize,
    pub stagger_step_ms: u64,
    /// Scene rotation easing back to zero
    pub settle_ms: u64,
    /// Scene spin while waiting and while drawing, radians per second
    pub ready_spin: f64,
    pub running_spin: f64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            formation_ms: 1000,
            boot_ms: 1000,
            reveal_position_ms: 1200,
            reveal_rotation_ms: 900,
            merge_retarget_ms: 2000,
            merge_grid_ms: 1000,
            burst_ms: 500,
            converge_ms: 1000,
            stagger_groups: 5,
            stagger_step_ms: 40,
            settle_ms: 800,
            ready_spin: std::f64::consts::PI * 0.1 * 1000.0 / 2000.0,
            running_spin: std::f64::consts::PI * 10.0 * 1000.0 / 3000.0,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub row_count: usize,
    pub card_size: CardSize,
    pub sphere_radius: f64,
    pub max_per_draw: u32,
    /// Auto-stop deadline while drawing; `None` waits for the operator
    pub auto_stop: Option<Duration>,
    pub ambient_tick: Duration,
    pub ambient_batch: usize,
    pub frame_interval: Duration,
    pub viewport: Viewport,
    pub data_path: PathBuf,
    pub feed_url: String,
    pub rng_seed: Option<u64>,
    pub timing: TimingSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            row_count: 17,
            card_size: CardSize::default(),
            sphere_radius: DEFAULT_SPHERE_RADIUS,
            max_per_draw: 10,
            auto_stop: None,
            ambient_tick: Duration::from_millis(200),
            ambient_batch: 4,
            frame_interval: Duration::from_millis(16),
            viewport: Viewport::default(),
            data_path: PathBuf::from("luckydraw.json"),
            feed_url: "ws://127.0.0.1:8080/api/ws".into(),
            rng_seed: None,
            timing: TimingSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Read `LUCKYDRAW_*` variables from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        let get = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let row_count = parse_or(get("LUCKYDRAW_ROW_COUNT"), "LUCKYDRAW_ROW_COUNT", defaults.row_count)?;
        let card_width = parse_or(
            get("LUCKYDRAW_CARD_WIDTH"),
            "LUCKYDRAW_CARD_WIDTH",
            defaults.card_size.width,
        )?;
        let card_height = parse_or(
            get("LUCKYDRAW_CARD_HEIGHT"),
            "LUCKYDRAW_CARD_HEIGHT",
            defaults.card_size.height,
        )?;
        let sphere_radius = parse_or(
            get("LUCKYDRAW_SPHERE_RADIUS"),
            "LUCKYDRAW_SPHERE_RADIUS",
            defaults.sphere_radius,
        )?;
        let max_per_draw = parse_or(
            get("LUCKYDRAW_MAX_PER_DRAW"),
            "LUCKYDRAW_MAX_PER_DRAW",
            defaults.max_per_draw,
        )?;
        let auto_stop_secs: u64 =
            parse_or(get("LUCKYDRAW_AUTO_STOP_SECS"), "LUCKYDRAW_AUTO_STOP_SECS", 0)?;
        let ambient_tick_ms: u64 =
            parse_or(get("LUCKYDRAW_AMBIENT_TICK_MS"), "LUCKYDRAW_AMBIENT_TICK_MS", 200)?;
        let ambient_batch = parse_or(
            get("LUCKYDRAW_AMBIENT_BATCH"),
            "LUCKYDRAW_AMBIENT_BATCH",
            defaults.ambient_batch,
        )?;
        let frame_ms: u64 = parse_or(get("LUCKYDRAW_FRAME_MS"), "LUCKYDRAW_FRAME_MS", 16)?;
        let viewport_width = parse_or(
            get("LUCKYDRAW_VIEWPORT_WIDTH"),
            "LUCKYDRAW_VIEWPORT_WIDTH",
            defaults.viewport.width,
        )?;
        let viewport_height = parse_or(
            get("LUCKYDRAW_VIEWPORT_HEIGHT"),
            "LUCKYDRAW_VIEWPORT_HEIGHT",
            defaults.viewport.height,
        )?;
        let rng_seed = match get("LUCKYDRAW_RNG_SEED") {
            Some(raw) => Some(parse("LUCKYDRAW_RNG_SEED", &raw)?),
            None => None,
        };

        for (key, value) in [
            ("LUCKYDRAW_CARD_WIDTH", card_width),
            ("LUCKYDRAW_CARD_HEIGHT", card_height),
            ("LUCKYDRAW_SPHERE_RADIUS", sphere_radius),
            ("LUCKYDRAW_VIEWPORT_WIDTH", viewport_width),
            ("LUCKYDRAW_VIEWPORT_HEIGHT", viewport_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid {
                    key,
                    value: value.to_string(),
                });
            }
        }
        if frame_ms == 0 || ambient_tick_ms == 0 {
            let key = if frame_ms == 0 {
                "LUCKYDRAW_FRAME_MS"
            } else {
                "LUCKYDRAW_AMBIENT_TICK_MS"
            };
            return Err(SettingsError::Invalid {
                key,
                value: "0".into(),
            });
        }

        Ok(Self {
            row_count,
            card_size: CardSize::new(card_width, card_height),
            sphere_radius,
            max_per_draw,
            auto_stop: (auto_stop_secs > 0).then(|| Duration::from_secs(auto_stop_secs)),
            ambient_tick: Duration::from_millis(ambient_tick_ms),
            ambient_batch,
            frame_interval: Duration::from_millis(frame_ms),
            viewport: Viewport {
                width: viewport_width,
                height: viewport_height,
            },
            data_path: get("LUCKYDRAW_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            feed_url: get("LUCKYDRAW_FEED_URL").unwrap_or(defaults.feed_url),
            rng_seed,
            timing: defaults.timing,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, SettingsError> {
    raw.parse().map_err(|_| SettingsError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, SettingsError> {
    match raw {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}
