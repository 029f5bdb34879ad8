#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum DisplayMode {
    #[default]
    Clock,
    /// Stopwatch counting up from the moment it was started.
    Timer,
    Countdown,
}

/// Fixed countdown durations offered by the chrono submenu.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChronoPreset {
    TenSeconds,
    TenMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    ThreeHours,
    FourHours,
    FiveHours,
}

impl ChronoPreset {
    pub const ALL: [ChronoPreset; 9] = [
        ChronoPreset::TenSeconds,
        ChronoPreset::TenMinutes,
        ChronoPreset::FifteenMinutes,
        ChronoPreset::ThirtyMinutes,
        ChronoPreset::OneHour,
        ChronoPreset::TwoHours,
        ChronoPreset::ThreeHours,
        ChronoPreset::FourHours,
        ChronoPreset::FiveHours,
    ];

    pub fn seconds(self) -> i64 {
        match self {
            ChronoPreset::TenSeconds => 10,
            ChronoPreset::TenMinutes => 10 * 60,
            ChronoPreset::FifteenMinutes => 15 * 60,
            ChronoPreset::ThirtyMinutes => 30 * 60,
            ChronoPreset::OneHour => 3_600,
            ChronoPreset::TwoHours => 2 * 3_600,
            ChronoPreset::ThreeHours => 3 * 3_600,
            ChronoPreset::FourHours => 4 * 3_600,
            ChronoPreset::FiveHours => 5 * 3_600,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChronoPreset::TenSeconds => "10s",
            ChronoPreset::TenMinutes => "10min",
            ChronoPreset::FifteenMinutes => "15min",
            ChronoPreset::ThirtyMinutes => "30min",
            ChronoPreset::OneHour => "1h",
            ChronoPreset::TwoHours => "2h",
            ChronoPreset::ThreeHours => "3h",
            ChronoPreset::FourHours => "4h",
            ChronoPreset::FiveHours => "5h",
        }
    }
}
