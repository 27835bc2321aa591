use crate::types::{HvacAction, HvacMode, RegulationMode, Snapshot, Temperature, Thermostat};

/// Host-facing cache of one device's last-known state. Updated in place on
/// every poll; identity is the room name, which is what the vendor app keys
/// thermostats by.
#[derive(Debug, Clone)]
pub struct ThermostatView {
    pub room: String,
    pub serial_number: String,
    pub online: bool,
    pub heating: bool,
    pub regulation_mode: RegulationMode,
    pub temperature: Temperature,
    pub target: Temperature,
}

impl ThermostatView {
    fn from_record(t: &Thermostat) -> Self {
        Self {
            room: t.room.clone(),
            serial_number: t.serial_number.clone(),
            online: t.online,
            heating: t.heating,
            regulation_mode: t.regulation_mode,
            temperature: t.temperature,
            target: t.effective_setpoint(),
        }
    }

    fn update_from(&mut self, t: &Thermostat) {
        self.serial_number = t.serial_number.clone();
        self.online = t.online;
        self.heating = t.heating;
        self.regulation_mode = t.regulation_mode;
        self.temperature = t.temperature;
        self.target = t.effective_setpoint();
    }

    /// What the device is doing. Offline trumps the heating flag.
    pub fn action(&self) -> HvacAction {
        if !self.online {
            HvacAction::Offline
        } else if self.heating {
            HvacAction::Heating
        } else {
            HvacAction::Idle
        }
    }

    /// Operating mode in host vocabulary. These are heat-only devices, so
    /// every non-schedule mode reads as Heat.
    pub fn hvac_mode(&self) -> HvacMode {
        if !self.online {
            HvacMode::Off
        } else if self.regulation_mode == RegulationMode::Auto {
            HvacMode::Auto
        } else {
            HvacMode::Heat
        }
    }
}

/// Folds a snapshot into the view list. Known rooms are overwritten in
/// place, new rooms are appended. Views are never removed; a device missing
/// from one snapshot keeps its last-known view.
pub(crate) fn update_views(views: &mut Vec<ThermostatView>, snapshot: &Snapshot) {
    for t in snapshot.thermostats() {
        match views.iter_mut().find(|v| v.room == t.room) {
            Some(view) => view.update_from(t),
            None => views.push(ThermostatView::from_record(t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    fn record(room: &str, serial: &str, online: bool, heating: bool) -> Thermostat {
        Thermostat {
            serial_number: serial.to_string(),
            room: room.to_string(),
            online,
            heating,
            regulation_mode: RegulationMode::Manual,
            temperature: Temperature::from_centidegrees(2150),
            set_point_temp: Temperature::from_centidegrees(2000),
            comfort_temperature: Temperature::from_centidegrees(2100),
            manual_temperature: Temperature::from_centidegrees(2200),
            vacation_temperature: Temperature::from_centidegrees(1500),
        }
    }

    fn snapshot(thermostats: Vec<Thermostat>) -> Snapshot {
        Snapshot {
            groups: vec![Group {
                group_name: "Home".to_string(),
                thermostats,
            }],
        }
    }

    #[test]
    fn offline_trumps_heating_flag() {
        let mut views = Vec::new();
        update_views(&mut views, &snapshot(vec![record("Bath", "123", false, true)]));
        assert_eq!(views[0].action(), HvacAction::Offline);
        assert_eq!(views[0].hvac_mode(), HvacMode::Off);
    }

    #[test]
    fn online_action_follows_heating_flag() {
        let mut views = Vec::new();
        update_views(&mut views, &snapshot(vec![record("Bath", "123", true, true)]));
        assert_eq!(views[0].action(), HvacAction::Heating);

        update_views(&mut views, &snapshot(vec![record("Bath", "123", true, false)]));
        assert_eq!(views[0].action(), HvacAction::Idle);
    }

    #[test]
    fn hvac_mode_auto_only_for_schedule_mode() {
        let mut auto = record("Bath", "123", true, false);
        auto.regulation_mode = RegulationMode::Auto;
        let mut views = Vec::new();
        update_views(&mut views, &snapshot(vec![auto]));
        assert_eq!(views[0].hvac_mode(), HvacMode::Auto);

        for mode in [
            RegulationMode::Comfort,
            RegulationMode::Manual,
            RegulationMode::Vacation,
        ] {
            let mut t = record("Bath", "123", true, false);
            t.regulation_mode = mode;
            update_views(&mut views, &snapshot(vec![t]));
            assert_eq!(views[0].hvac_mode(), HvacMode::Heat);
        }
    }

    #[test]
    fn target_follows_active_mode() {
        let mut views = Vec::new();
        update_views(&mut views, &snapshot(vec![record("Bath", "123", true, false)]));
        // Manual mode, so the manual setpoint is the target.
        assert_eq!(views[0].target, Temperature::from_centidegrees(2200));

        let mut t = record("Bath", "123", true, false);
        t.regulation_mode = RegulationMode::Comfort;
        update_views(&mut views, &snapshot(vec![t]));
        assert_eq!(views[0].target, Temperature::from_centidegrees(2100));
    }

    #[test]
    fn views_match_by_room_and_never_drop() {
        let mut views = Vec::new();
        update_views(
            &mut views,
            &snapshot(vec![
                record("Bath", "123", true, false),
                record("Kitchen", "456", true, true),
            ]),
        );
        assert_eq!(views.len(), 2);

        // Kitchen disappears, Bath gets a new serial, Hall is new.
        update_views(
            &mut views,
            &snapshot(vec![
                record("Bath", "999", true, true),
                record("Hall", "789", true, false),
            ]),
        );
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].room, "Bath");
        assert_eq!(views[0].serial_number, "999");
        assert!(views[0].heating);
        assert_eq!(views[1].room, "Kitchen");
        assert_eq!(views[2].room, "Hall");
    }
}
