use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

/// Coarse grouping of client device types.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceCategory {
    ComputersPersonal,
    Entertainment,
    Home,
    Other,
}

impl DeviceCategory {
    /// Category for a client `device_type`; `None` for unknown types.
    pub fn from_device_type(device_type: &str) -> Option<Self> {
        let category = match device_type {
            "desktop_computer" | "e_reader" | "hard_drive" | "laptop_computer" | "phone"
            | "printer" | "tablet" | "watch" => Self::ComputersPersonal,

            "audio" | "cable_box" | "game_console" | "media_streamer" | "remote"
            | "television" => Self::Entertainment,

            "air_conditioner" | "air_purifier" | "alarm_system" | "bed" | "car"
            | "coffee_maker" | "digital_assistant" | "door_bell" | "door_lock"
            | "exercise_bike" | "fan" | "garage_door" | "hub" | "light" | "oven"
            | "pet_device" | "plug" | "refrigerator" | "scale" | "security_camera"
            | "smoke_detector" | "sprinkler" | "thermostat" | "toaster" | "vacuum"
            | "washer_dryer" => Self::Home,

            "network_equipment" | "generic" => Self::Other,

            _ => return None,
        };
        Some(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [(&str, DeviceCategory); 42] = [
        ("desktop_computer", DeviceCategory::ComputersPersonal),
        ("e_reader", DeviceCategory::ComputersPersonal),
        ("hard_drive", DeviceCategory::ComputersPersonal),
        ("laptop_computer", DeviceCategory::ComputersPersonal),
        ("phone", DeviceCategory::ComputersPersonal),
        ("printer", DeviceCategory::ComputersPersonal),
        ("tablet", DeviceCategory::ComputersPersonal),
        ("watch", DeviceCategory::ComputersPersonal),
        ("audio", DeviceCategory::Entertainment),
        ("cable_box", DeviceCategory::Entertainment),
        ("game_console", DeviceCategory::Entertainment),
        ("media_streamer", DeviceCategory::Entertainment),
        ("remote", DeviceCategory::Entertainment),
        ("television", DeviceCategory::Entertainment),
        ("air_conditioner", DeviceCategory::Home),
        ("air_purifier", DeviceCategory::Home),
        ("alarm_system", DeviceCategory::Home),
        ("bed", DeviceCategory::Home),
        ("car", DeviceCategory::Home),
        ("coffee_maker", DeviceCategory::Home),
        ("digital_assistant", DeviceCategory::Home),
        ("door_bell", DeviceCategory::Home),
        ("door_lock", DeviceCategory::Home),
        ("exercise_bike", DeviceCategory::Home),
        ("fan", DeviceCategory::Home),
        ("garage_door", DeviceCategory::Home),
        ("hub", DeviceCategory::Home),
        ("light", DeviceCategory::Home),
        ("oven", DeviceCategory::Home),
        ("pet_device", DeviceCategory::Home),
        ("plug", DeviceCategory::Home),
        ("refrigerator", DeviceCategory::Home),
        ("scale", DeviceCategory::Home),
        ("security_camera", DeviceCategory::Home),
        ("smoke_detector", DeviceCategory::Home),
        ("sprinkler", DeviceCategory::Home),
        ("thermostat", DeviceCategory::Home),
        ("toaster", DeviceCategory::Home),
        ("vacuum", DeviceCategory::Home),
        ("washer_dryer", DeviceCategory::Home),
        ("network_equipment", DeviceCategory::Other),
        ("generic", DeviceCategory::Other),
    ];

    #[test]
    fn every_known_type_has_exactly_its_category() {
        for (device_type, expected) in KNOWN {
            assert_eq!(
                DeviceCategory::from_device_type(device_type),
                Some(expected),
                "{device_type}"
            );
        }
    }

    #[test]
    fn unknown_types_have_no_category() {
        assert_eq!(DeviceCategory::from_device_type("spaceship"), None);
        assert_eq!(DeviceCategory::from_device_type(""), None);
        assert_eq!(DeviceCategory::from_device_type("Phone"), None);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(DeviceCategory::ComputersPersonal.to_string(), "computers_personal");
    }
}
