use std::{env, path::PathBuf, time::Duration};

// Runtime constants (not gameplay tuning; those live in the settings document).

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

pub fn ticks_per_second() -> u32 {
    parsed("TICKS_PER_SECOND", 60).max(1)
}

pub fn tick_interval() -> Duration {
    Duration::from_secs(1) / ticks_per_second()
}

pub fn notification_drain_per_tick() -> usize {
    parsed("NOTIFICATION_DRAIN_PER_TICK", 10)
}

pub fn hook_init_delay_ticks() -> u32 {
    parsed("HOOK_INIT_DELAY_TICKS", 300)
}

pub fn mass_refresh_ticks() -> u32 {
    parsed("MASS_REFRESH_TICKS", 60)
}

pub fn fault_notice_cooldown() -> Duration {
    Duration::from_millis(parsed("FAULT_NOTICE_COOLDOWN_MS", 10_000))
}

pub fn settings_path() -> PathBuf {
    env::var("SETTINGS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("combat_interdiction_settings.toml"))
}

// Ticks the headless demo runs before shutting down (0 runs until Ctrl-C).
pub fn demo_ticks() -> u64 {
    parsed("DEMO_TICKS", 600)
}
