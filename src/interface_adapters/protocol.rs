// Wire protocol DTOs for boost sync, settings updates and ship status.
// The transport carrying them lives outside this crate.

use std::fmt;

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::notifications::MessageColor;
use crate::domain::ports::HostWorld;
use crate::domain::ship::{BlockId, PlayerId, SizeClass, VehicleId};
use crate::use_cases::session::InterdictionSession;

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Cruise flag replicated from the pilot's terminal.
    SyncBoost {
        vehicle_id: VehicleId,
        controller_id: BlockId,
        value: bool,
    },
    // Admin change of a named setting.
    UpdateSetting { name: String, value: String },
}

/// Messages the server sends to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    Chat { text: String, color: MessageColor },
    ShipStatus(ShipStatusDto),
}

/// Governor view of a single vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct ShipStatusDto {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub size: SizeClass,
    pub in_combat: bool,
    // Whole seconds of combat left, rounded up.
    pub combat_seconds_left: u32,
    pub in_water: bool,
    pub is_submerged: bool,
    pub is_on_boost: bool,
    pub air_density: f32,
    pub position: DVec3,
    pub linear_velocity: Vec3,
}

impl ShipStatusDto {
    // Builds the status from the registry and the host; `None` for unknown vehicles.
    pub fn capture(
        session: &InterdictionSession,
        world: &dyn HostWorld,
        vehicle_id: VehicleId,
    ) -> Option<Self> {
        let ship = session.registry().get(vehicle_id)?;
        let state = ship.snapshot().ok()?;
        let grid = world.grid_state(vehicle_id)?;
        let ticks_per_second = session.config().ticks_per_second.max(1);

        Some(Self {
            vehicle_id,
            name: ship.name().to_string(),
            size: ship.size(),
            in_combat: state.in_combat(),
            combat_seconds_left: state.interdiction_duration.div_ceil(ticks_per_second),
            in_water: state.in_water,
            is_submerged: state.is_submerged,
            is_on_boost: state.is_on_boost,
            air_density: state.air_density,
            position: grid.position,
            linear_velocity: grid.linear_velocity,
        })
    }
}

#[derive(Debug)]
pub enum ProtocolError {
    Decode(String),
    Encode(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Decode(reason) => write!(f, "invalid client message: {reason}"),
            ProtocolError::Encode(reason) => write!(f, "failed to encode server message: {reason}"),
        }
    }
}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Decode(e.to_string()))
}

pub fn encode_server_message(message: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(|e| ProtocolError::Encode(e.to_string()))
}

// Who sent a message. Filled in by the transport from its authenticated
// connection, never read from the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sender {
    pub player_id: PlayerId,
    pub is_admin: bool,
}

/// Applies a decoded client message. Returns whether the session accepted it.
/// Setting updates are refused unless the sender is an admin.
pub fn handle_client_message(
    session: &InterdictionSession,
    sender: Sender,
    message: ClientMessage,
) -> bool {
    match message {
        ClientMessage::SyncBoost {
            vehicle_id,
            controller_id,
            value,
        } => {
            let accepted = session.sync_boost_request(vehicle_id, controller_id, value);
            debug!(
                player_id = sender.player_id,
                vehicle_id, controller_id, value, accepted, "boost sync received"
            );
            accepted
        }
        ClientMessage::UpdateSetting { name, value } => {
            if !sender.is_admin {
                warn!(
                    player_id = sender.player_id,
                    setting = %name,
                    "setting update refused, not an admin"
                );
                return false;
            }
            session.update_setting(&name, &value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface_adapters::memory_host::{ControllerSpec, GridSpec};
    use crate::use_cases::cruise::CRUISE_STORAGE_KEY;
    use crate::use_cases::test_support::SessionFixture;
    use serde_json::json;

    #[test]
    fn when_sync_boost_is_decoded_then_fields_are_read_from_data() {
        let text = r#"{"type":"SyncBoost","data":{"vehicle_id":7,"controller_id":70,"value":true}}"#;

        let message = decode_client_message(text).expect("valid message");

        assert_eq!(
            message,
            ClientMessage::SyncBoost {
                vehicle_id: 7,
                controller_id: 70,
                value: true,
            }
        );
    }

    #[test]
    fn when_message_type_is_unknown_then_decode_fails() {
        let result = decode_client_message(r#"{"type":"Teleport","data":{}}"#);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn when_chat_is_encoded_then_color_is_a_plain_name() {
        let message = ServerMessage::Chat {
            text: "Entered COMBAT MODE".to_string(),
            color: MessageColor::Red,
        };

        let encoded = encode_server_message(&message).expect("encodable");
        let value: serde_json::Value = serde_json::from_str(&encoded).expect("json");

        assert_eq!(
            value,
            json!({"type": "Chat", "data": {"text": "Entered COMBAT MODE", "color": "Red"}})
        );
    }

    #[test]
    fn when_client_messages_are_applied_then_session_state_changes() {
        let f = SessionFixture::started();
        f.host.add_grid(GridSpec::new(1, SizeClass::Small));
        f.host.add_controller(1, ControllerSpec::new(10).piloted_by(2));
        f.session.on_entity_added(1);
        f.session.update_ships();

        let boost = decode_client_message(
            r#"{"type":"SyncBoost","data":{"vehicle_id":1,"controller_id":10,"value":true}}"#,
        )
        .expect("valid");
        let setting = decode_client_message(
            r#"{"type":"UpdateSetting","data":{"name":"interdictionDuration","value":"30"}}"#,
        )
        .expect("valid");

        let admin = Sender {
            player_id: 2,
            is_admin: true,
        };
        assert!(handle_client_message(&f.session, admin, boost));
        assert!(handle_client_message(&f.session, admin, setting));
        assert_eq!(f.host.stored_value(10, CRUISE_STORAGE_KEY).as_deref(), Some("true"));
        assert_eq!(f.session.get_setting("interdictionDuration").as_deref(), Some("30"));
    }

    #[test]
    fn when_player_without_admin_rights_updates_a_setting_then_it_is_refused() {
        let f = SessionFixture::started();
        let player = Sender {
            player_id: 9,
            is_admin: false,
        };
        let setting = decode_client_message(
            r#"{"type":"UpdateSetting","data":{"name":"combatZoneRadius","value":"500"}}"#,
        )
        .expect("valid");

        assert!(!handle_client_message(&f.session, player, setting));
        assert_eq!(f.session.get_setting("combatZoneRadius").as_deref(), Some("15000"));
    }

    #[test]
    fn when_status_is_captured_then_vectors_serialize_as_arrays() {
        let f = SessionFixture::started();
        f.host.add_grid(
            GridSpec::new(1, SizeClass::Large)
                .named("Hauler")
                .at(DVec3::new(1.0, 2.0, 3.0))
                .moving(Vec3::X * 10.0),
        );
        f.session.on_entity_added(1);

        let status = ShipStatusDto::capture(&f.session, f.host.as_ref(), 1).expect("status");
        let value = serde_json::to_value(ServerMessage::ShipStatus(status)).expect("json");

        assert_eq!(value["type"], "ShipStatus");
        assert_eq!(value["data"]["name"], "Hauler");
        assert_eq!(value["data"]["size"], "Large");
        assert_eq!(value["data"]["position"], json!([1.0, 2.0, 3.0]));
        assert_eq!(value["data"]["linear_velocity"], json!([10.0, 0.0, 0.0]));
        assert!(ShipStatusDto::capture(&f.session, f.host.as_ref(), 2).is_none());
    }
}
