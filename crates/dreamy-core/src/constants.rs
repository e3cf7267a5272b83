// ABOUTME: Application constants grouped by domain
// ABOUTME: Physiological bounds, analytics windows, OAuth and sync limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Dreamy

//! Constants module
//!
//! Constants are grouped into small domain modules rather than one flat list.

/// Network defaults
pub mod network {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
    /// Default bind address
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    /// Default `SQLite` database URL
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/dreamy.db";
    /// Request timeout applied by the HTTP layer
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// Heart rate bounds
pub mod heart_rate {
    /// Lowest plausible heart rate accepted on manual entry
    pub const MIN_VALID_BPM: u32 = 30;
    /// Highest plausible heart rate accepted on manual entry
    pub const MAX_VALID_BPM: u32 = 250;
    /// Lowest split heart rate used for threshold detection
    pub const SPLIT_MIN_BPM: f64 = 60.0;
    /// Highest split heart rate used for threshold detection
    pub const SPLIT_MAX_BPM: f64 = 220.0;
    /// Fraction of max HR used when no threshold window exists
    pub const LTHR_FROM_MAX_FRACTION: f64 = 0.89;
    /// Correction applied to a 20-minute window average
    pub const TWENTY_MINUTE_CORRECTION: f64 = 0.98;
    /// Default resting heart rate when the profile has none
    pub const DEFAULT_RESTING_BPM: f64 = 60.0;
}

/// Training load defaults
pub mod load {
    /// Chronic training load window in days
    pub const CTL_DAYS: u32 = 42;
    /// Acute training load window in days
    pub const ATL_DAYS: u32 = 7;
    /// Default number of days returned by the load endpoint
    pub const DEFAULT_SERIES_DAYS: u32 = 90;
    /// Extra history loaded before a series so the averages are warmed up
    pub const WARMUP_DAYS: i64 = 84;
    /// Days over which the ramp rate is measured
    pub const RAMP_RATE_DAYS: usize = 7;
}

/// Fitness estimation defaults
pub mod fitness {
    /// Minimum distance considered a fitness-revealing effort
    pub const MIN_PERFORMANCE_METERS: f64 = 1500.0;
    /// Default look-back window for the current VDOT
    pub const DEFAULT_WINDOW_DAYS: u32 = 120;
    /// Lowest VDOT accepted for predictions
    pub const MIN_VDOT: f64 = 15.0;
    /// Highest VDOT accepted for predictions
    pub const MAX_VDOT: f64 = 90.0;
    /// Slowest velocity accepted, meters per minute
    pub const MIN_VELOCITY_M_PER_MIN: f64 = 100.0;
    /// Fastest velocity accepted, meters per minute
    pub const MAX_VELOCITY_M_PER_MIN: f64 = 500.0;
    /// Default Riegel fatigue exponent
    pub const RIEGEL_EXPONENT: f64 = 1.06;
}

/// Manual entry limits
pub mod validation {
    /// Lowest perceived effort
    pub const MIN_RPE: u8 = 1;
    /// Highest perceived effort
    pub const MAX_RPE: u8 = 10;
    /// Longest accepted activity or split duration (7 days)
    pub const MAX_DURATION_SECONDS: u32 = 7 * 24 * 3600;
    /// Longest accepted activity name
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Maximum activities returned by one list call
    pub const MAX_LIST_LIMIT: u32 = 500;
    /// Default activities returned by one list call
    pub const DEFAULT_LIST_LIMIT: u32 = 50;
}

/// OAuth and Strava limits
pub mod oauth {
    /// Provider name used in errors and logs
    pub const STRAVA: &str = "strava";
    /// Default Strava API base URL
    pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
    /// Default Strava authorization URL
    pub const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";
    /// Default Strava token URL
    pub const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
    /// Default Strava deauthorization URL
    pub const STRAVA_DEAUTH_URL: &str = "https://www.strava.com/oauth/deauthorize";
    /// Scopes requested during authorization
    pub const STRAVA_SCOPES: &str = "read,activity:read_all,profile:read_all";
    /// Refresh tokens this close to expiry
    pub const REFRESH_MARGIN_SECS: i64 = 300;
    /// Lifetime of an OAuth CSRF state value
    pub const STATE_TTL_SECS: i64 = 600;
    /// Random bytes in an OAuth CSRF state value
    pub const STATE_BYTES: usize = 32;
}

/// Sync defaults
pub mod sync {
    /// Days of history fetched on a first sync
    pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;
    /// Detail requests made per sync run
    pub const DEFAULT_DETAIL_LIMIT: u32 = 30;
    /// Activities per Strava list page
    pub const PAGE_SIZE: u32 = 100;
    /// Hard stop on pages fetched per sync run
    pub const MAX_PAGES: u32 = 20;
}
