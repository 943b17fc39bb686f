// Framework bootstrap: tracing, the fixed-step tick loop and the headless demo world.

use std::io::Result;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::{DVec3, Vec3};
use tracing::{debug, info, warn};

use crate::domain::damage::{DamageEvent, DamageType};
use crate::domain::ports::{BlockStorage, Clock};
use crate::domain::ship::SizeClass;
use crate::frameworks::config;
use crate::frameworks::settings_file::FileSettingsStore;
use crate::interface_adapters::memory_host::{ControllerSpec, GridSpec, MemoryHost, ThrusterSpec};
use crate::interface_adapters::protocol::{ServerMessage, ShipStatusDto, encode_server_message};
use crate::interface_adapters::settings_document::TomlSettingsRepository;
use crate::use_cases::cruise::CRUISE_STORAGE_KEY;
use crate::use_cases::session::{HostPorts, InterdictionSession, SessionConfig};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Wall clock for fault-notice rate limiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        ticks_per_second: config::ticks_per_second(),
        notification_drain_per_tick: config::notification_drain_per_tick(),
        hook_delay_ticks: config::hook_init_delay_ticks(),
        mass_refresh_ticks: config::mass_refresh_ticks(),
        fault_notice_cooldown: config::fault_notice_cooldown(),
    }
}

/// What one tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub governed: usize,
    pub speed_limited: usize,
    pub failures: usize,
    pub delivered: usize,
}

/// Runs the governor pass and the notification drain on blocking workers
/// and waits for both. A panicking pass is reported as a fault.
pub async fn run_tick(session: &Arc<InterdictionSession>) -> TickSummary {
    let governor = tokio::task::spawn_blocking({
        let session = Arc::clone(session);
        move || session.update_ships()
    });
    let notifications = tokio::task::spawn_blocking({
        let session = Arc::clone(session);
        move || session.process_notifications()
    });
    let (governor, notifications) = tokio::join!(governor, notifications);

    let mut summary = TickSummary::default();
    match governor {
        Ok(report) => {
            summary.governed = report.governed;
            summary.speed_limited = report.speed_limited;
            summary.failures = report.failures.len();
        }
        Err(e) => {
            session.report_fault("governor", &e);
        }
    }
    match notifications {
        Ok(delivered) => summary.delivered = delivered,
        Err(e) => {
            session.report_fault("notifications", &e);
        }
    }
    summary
}

// Scripted traffic for the headless binary.
struct DemoWorld;

impl DemoWorld {
    const INTERCEPTOR: i64 = 1;
    const RAIDER: i64 = 2;
    const HAULER: i64 = 3;
    const ENGAGEMENT_TICK: u64 = 60;

    fn populate(host: &MemoryHost, session: &InterdictionSession) {
        host.add_grid(
            GridSpec::new(Self::INTERCEPTOR, SizeClass::Small)
                .named("Interceptor")
                .moving(Vec3::X * 320.0),
        );
        host.add_thruster(Self::INTERCEPTOR, ThrusterSpec::ion(10).with_thrust(40_000.0));
        host.add_controller(Self::INTERCEPTOR, ControllerSpec::new(11).piloted_by(100));

        host.add_grid(
            GridSpec::new(Self::RAIDER, SizeClass::Small)
                .named("Raider")
                .at(DVec3::new(800.0, 0.0, 0.0))
                .moving(Vec3::NEG_X * 90.0)
                .npc_owned(),
        );
        host.add_thruster(Self::RAIDER, ThrusterSpec::gas(20).with_thrust(60_000.0));

        host.add_grid(
            GridSpec::new(Self::HAULER, SizeClass::Large)
                .named("Hauler")
                .at(DVec3::new(40_000.0, 0.0, 0.0))
                .moving(Vec3::Z * 140.0),
        );
        host.add_thruster(Self::HAULER, ThrusterSpec::ion(30).with_thrust(2_000_000.0));
        host.add_controller(Self::HAULER, ControllerSpec::new(31).piloted_by(200));
        host.write(31, CRUISE_STORAGE_KEY, true.to_string());

        for grid in [Self::INTERCEPTOR, Self::RAIDER, Self::HAULER] {
            session.on_entity_added(grid);
        }
    }

    fn on_tick(tick: u64, session: &InterdictionSession) {
        if tick == Self::ENGAGEMENT_TICK {
            let report = session.on_damage(&DamageEvent {
                target_block: 10,
                attacker_id: Self::RAIDER,
                damage_type: DamageType::Bullet,
                amount: 25.0,
            });
            info!(armed = report.armed.len(), "raider opened fire");
        }
    }
}

/// Drives the session at a fixed step until `ticks` have run (0 means until Ctrl-C).
pub async fn run(session: Arc<InterdictionSession>, host: Arc<MemoryHost>, ticks: u64) -> Result<()> {
    let Some(outcome) = session.start() else {
        warn!("session already running");
        return Ok(());
    };
    debug!(?outcome, "settings loaded");
    DemoWorld::populate(&host, &session);

    let tick_interval = config::tick_interval();
    let mut interval = tokio::time::interval(tick_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let ticks_per_second = u64::from(session.config().ticks_per_second.max(1));

    let mut tick: u64 = 0;
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut shutdown => {
                info!(tick, "shutdown requested");
                break;
            }
        }

        host.step(tick_interval.as_secs_f64());
        DemoWorld::on_tick(tick, &session);
        let summary = run_tick(&session).await;
        if tick % ticks_per_second == 0 {
            debug!(tick, ?summary, "tick");
        }

        tick += 1;
        if ticks > 0 && tick >= ticks {
            break;
        }
    }

    for ship in session.registry().all() {
        let Some(status) = ShipStatusDto::capture(&session, host.as_ref(), ship.id()) else {
            continue;
        };
        match encode_server_message(&ServerMessage::ShipStatus(status)) {
            Ok(message) => info!(%message, "ship status"),
            Err(e) => warn!(error = %e, "ship status not encodable"),
        }
    }
    for chat in host.chats() {
        info!(recipient = chat.recipient, text = %chat.text, color = %chat.color, "chat");
    }

    session.stop();
    info!(ticks = tick, "demo finished");
    Ok(())
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let host = Arc::new(MemoryHost::new());
    let settings_path = config::settings_path();
    info!(path = %settings_path.display(), "using settings file");
    let ports = HostPorts {
        world: host.clone(),
        environment: host.clone(),
        storage: host.clone(),
        sink: host.clone(),
        settings: Arc::new(TomlSettingsRepository::new(FileSettingsStore::new(
            settings_path,
        ))),
        clock: Arc::new(SystemClock),
    };
    let session = Arc::new(InterdictionSession::new(session_config(), ports));

    run(session, host, config::demo_ticks()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::memory_host::MemorySettingsRepository;

    fn demo_session() -> (Arc<MemoryHost>, Arc<InterdictionSession>) {
        let host = Arc::new(MemoryHost::new());
        let ports = HostPorts {
            world: host.clone(),
            environment: host.clone(),
            storage: host.clone(),
            sink: host.clone(),
            settings: Arc::new(MemorySettingsRepository::default()),
            clock: Arc::new(SystemClock),
        };
        let config = SessionConfig {
            hook_delay_ticks: 0,
            ..SessionConfig::default()
        };
        (host, Arc::new(InterdictionSession::new(config, ports)))
    }

    #[tokio::test]
    async fn when_tick_runs_then_both_passes_complete() {
        let (host, session) = demo_session();
        session.start();
        DemoWorld::populate(&host, &session);

        let summary = run_tick(&session).await;

        // Interceptor and hauler are governed; the idle NPC raider is skipped.
        assert_eq!(summary.governed, 2);
        assert_eq!(summary.speed_limited, 1);
        assert_eq!(summary.failures, 0);
    }

    #[tokio::test]
    async fn when_engagement_happens_then_pilot_message_is_delivered_next_tick() {
        let (host, session) = demo_session();
        session.start();
        DemoWorld::populate(&host, &session);

        DemoWorld::on_tick(DemoWorld::ENGAGEMENT_TICK, &session);
        let summary = run_tick(&session).await;

        assert_eq!(summary.delivered, 1);
        assert_eq!(host.chats()[0].recipient, 100);
        assert!(!session.registry().get(DemoWorld::HAULER).expect("hauler").in_combat());
    }
}
