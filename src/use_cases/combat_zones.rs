// Combat-zone detector: damage events arm the combat timers of nearby ships.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::damage::{DamageClass, DamageEvent};
use crate::domain::errors::GovernorError;
use crate::domain::notifications::CombatMessage;
use crate::domain::ports::HostWorld;
use crate::domain::settings::Settings;
use crate::domain::ship::VehicleId;
use crate::use_cases::notifier::CombatNotifier;
use crate::use_cases::registry::ShipRegistry;

/// Result of handling one damage event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ZoneReport {
    // Ships whose timers were reset.
    pub armed: Vec<VehicleId>,
    // Ships that were at peace before this event.
    pub entered: Vec<VehicleId>,
}

pub struct CombatZoneDetector {
    world: Arc<dyn HostWorld>,
    notifier: CombatNotifier,
    ticks_per_second: u32,
}

impl CombatZoneDetector {
    pub fn new(world: Arc<dyn HostWorld>, notifier: CombatNotifier, ticks_per_second: u32) -> Self {
        Self {
            world,
            notifier,
            ticks_per_second,
        }
    }

    // Arms every registered ship inside the combat sphere around the engagement.
    //
    // Participants that vanished or are being removed make this a silent no-op.
    // Pilots of ships entering combat get one message each; ships without a
    // pilot, NPC ships included, are armed silently.
    pub fn handle_damage(
        &self,
        event: &DamageEvent,
        registry: &ShipRegistry,
        settings: &Settings,
    ) -> Result<ZoneReport, GovernorError> {
        let mut report = ZoneReport::default();

        let class = event.damage_type.class();
        if class == DamageClass::NonCombat {
            return Ok(report);
        }
        let Some(target) = self.world.resolve_top_level(event.target_block) else {
            return Ok(report);
        };
        let (Some(target_position), Some(attacker_position)) = (
            self.world.entity_position(target),
            self.world.entity_position(event.attacker_id),
        ) else {
            return Ok(report);
        };
        if class == DamageClass::Deformation && !self.world.is_grid(event.attacker_id) {
            trace!(target, attacker = event.attacker_id, "deformation without a grid attacker");
            return Ok(report);
        }
        if self.world.is_marked_for_close(target) || self.world.is_marked_for_close(event.attacker_id) {
            return Ok(report);
        }

        let center = (target_position + attacker_position) * 0.5;
        if !center.is_finite() {
            return Err(GovernorError::CombatZone {
                detail: format!(
                    "engagement between {target} and {} has no finite position",
                    event.attacker_id
                ),
            });
        }
        let radius = f64::from(settings.combat_zone_radius);
        let duration = settings.interdiction_ticks(self.ticks_per_second);

        let mut seen = HashSet::new();
        for entity in self.world.entities_in_sphere(center, radius) {
            if !self.world.is_grid(entity) {
                continue;
            }
            let Some(vehicle_id) = self.world.resolve_top_level(entity) else {
                continue;
            };
            if !seen.insert(vehicle_id) || self.world.is_marked_for_close(vehicle_id) {
                continue;
            }
            let Some(ship) = registry.get(vehicle_id) else {
                continue;
            };

            let was_in_combat = ship.state()?.arm_combat(duration);
            report.armed.push(vehicle_id);
            if !was_in_combat {
                report.entered.push(vehicle_id);
                debug!(vehicle_id, "ship entered combat");
                if let Some(pilot) = self.world.controlling_player(vehicle_id) {
                    self.notifier.send(CombatMessage::entered_combat(pilot));
                }
            }
        }

        Ok(report)
    }
}
