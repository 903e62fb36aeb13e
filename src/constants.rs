pub mod telemetry {
    use std::ops::RangeInclusive;

    pub const FRESHNESS_WINDOW_SECONDS: i64 = 300;

    pub const SCAN_GAS_LEVEL: RangeInclusive<f64> = 0.0..=100.0;

    pub const PRESSURE_PSI: RangeInclusive<f64> = 14.0..=16.0;

    pub const TEMPERATURE_C: RangeInclusive<f64> = 20.0..=30.0;

    pub const FLOW_RATE_LPH: RangeInclusive<f64> = 2.0..=3.0;

    pub const TANK_LEVEL: RangeInclusive<f64> = 60.0..=95.0;

    pub const ESTIMATED_HOURS: RangeInclusive<f64> = 20.0..=50.0;

    pub const LEVEL_JITTER: RangeInclusive<f64> = -5.0..=5.0;

    pub const SCAN_ID: RangeInclusive<i64> = 1000..=9999;

    pub const SCAN_DURATION_SECONDS: i32 = 30;

    pub const RECENT_READINGS: i64 = 5;

    pub const RECENT_READINGS_SPACING_MINUTES: i64 = 30;
}

/// Values used when a per-user record is created on first access.
pub mod defaults {
    pub const REGULATOR_PRESSURE: f64 = 15.2;

    pub const REGULATOR_FLOW_RATE: f64 = 2.5;

    pub const REGULATOR_TEMPERATURE: f64 = 22.5;

    pub const REGULATOR_ON: bool = true;

    pub const REGULATOR_AUTO: bool = true;

    /// Name and starting health of the sections seeded for a new user.
    pub const PIPELINE_SECTIONS: [(&str, f64); 4] = [
        ("Main Line", 92.0),
        ("Kitchen", 88.0),
        ("Water Heater", 75.0),
        ("Outdoor", 95.0),
    ];

    pub const INSPECTION_AGE_HOURS: std::ops::RangeInclusive<i64> = 1..=24;

    #[must_use]
    pub fn regulator_id(user_id: i32) -> String {
        format!("REG_{user_id}")
    }

    #[must_use]
    pub fn device_code(user_id: i32) -> String {
        format!("DEV_{user_id}")
    }
}

pub mod emergency {
    pub const SOS_ID: std::ops::RangeInclusive<i64> = 10000..=99999;

    pub const ESTIMATED_RESPONSE_TIME: &str = "5-10 minutes";
}

pub mod limits {
    pub const DASHBOARD_RECENT_ALERTS: u64 = 5;

    pub const UPCOMING_MAINTENANCE: u64 = 3;

    pub const DEFAULT_READINGS_LIMIT: u64 = 20;

    pub const MAX_READINGS_LIMIT: u64 = 1000;
}
