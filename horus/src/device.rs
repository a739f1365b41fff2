use chrono::{DateTime, TimeZone, Utc};
use horus_core::{
    BuildOptions, GroupState, Ident, InfoState, Label, LightState, LocationState, Message,
    MessageType, Payload, Power, VersionState, HSBK,
};
use log::{debug, info};
use serde::Serialize;

use crate::products::{Product, ProductCatalog};
use crate::transport::{Protocol, Transport};
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: Ident,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: Ident,
    #[serde(rename = "name")]
    pub label: String,
}

/// Time statistics reported by a device, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub time: u64,
    pub up_time: u64,
    pub down_time: u64,
}

impl Info {
    /// The device's own clock.
    pub fn clock(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.time.min(i64::MAX as u64) as i64)
    }
}

/// What a set-state request may change.  Anything left `None` is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub color: Option<HSBK>,
    pub power: Option<Power>,
    pub label: Option<String>,
}

/// One configured light and what we last heard from it.
///
/// Note that the data stored in this struct is not "live": it is as fresh as the last
/// [Device::update] or mutation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub uuid: String,
    pub label: String,
    pub connected: bool,
    pub power: Power,
    #[serde(rename = "hsbk")]
    pub color: Option<HSBK>,
    pub infrared: u16,
    pub group: Option<Group>,
    pub product: Option<Product>,
    pub info: Option<Info>,
    pub location: Option<Location>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub protocol: Protocol,
    #[serde(skip)]
    target: Option<[u8; 8]>,
    #[serde(skip)]
    source: u32,
    #[serde(skip)]
    transport: Option<Box<dyn Transport>>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("uuid", &self.uuid)
            .field("label", &self.label)
            .field("connected", &self.connected)
            .field("power", &self.power)
            .field("color", &self.color)
            .field("address", &self.address)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl Device {
    pub fn new(uuid: &str, address: Option<String>, port: Option<u16>, protocol: Protocol) -> Device {
        Device {
            uuid: uuid.to_owned(),
            label: String::new(),
            connected: false,
            power: Power::Off,
            color: None,
            infrared: 0,
            group: None,
            product: None,
            info: None,
            location: None,
            address,
            port,
            protocol,
            target: None,
            source: 0,
            transport: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Device {
        self.label = label.to_owned();
        self
    }

    /// Address requests to this device id instead of sending them tagged.
    pub fn with_target(mut self, target: Option<[u8; 8]>) -> Device {
        self.target = target;
        self
    }

    pub fn with_source(mut self, source: u32) -> Device {
        self.source = source;
        self
    }

    /// Use this transport instead of creating one from the protocol on first use.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Device {
        self.transport = Some(transport);
        self
    }

    fn options(&self) -> BuildOptions {
        BuildOptions {
            target: self.target,
            source: self.source,
        }
    }

    fn name(&self) -> String {
        if !self.uuid.is_empty() {
            self.uuid.clone()
        } else if !self.label.is_empty() {
            self.label.clone()
        } else {
            self.address.clone().unwrap_or_else(|| "unnamed device".to_owned())
        }
    }

    fn context(&self, op: &'static str, e: Error) -> Error {
        Error::Device {
            op,
            device: self.name(),
            source: Box::new(e),
        }
    }

    /// Sends a message and decodes the single reply.
    pub fn send(&mut self, msg: &Message) -> Result<Message, Error> {
        let address = self
            .address
            .clone()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::Malformed("device address".to_owned()))?;
        let port = self
            .port
            .ok_or_else(|| Error::Malformed("device port".to_owned()))?;

        let packet = msg.pack()?;
        let protocol = self.protocol;
        let transport = self.transport.get_or_insert_with(|| protocol.client());

        debug!("{:?} -> {}:{}", msg.message_type(), address, port);
        let reply = transport.send(&address, port, &packet)?;
        let reply = Message::unpack(&reply)?;
        debug!("{:?} <- {}:{}", reply.message_type(), address, port);
        Ok(reply)
    }

    fn exchange(
        &mut self,
        op: &'static str,
        msg: Result<Message, horus_core::Error>,
    ) -> Result<Message, Error> {
        let result = msg.map_err(Error::from).and_then(|msg| self.send(&msg));
        result.map_err(|e| self.context(op, e))
    }

    fn query<P: Payload>(&mut self, op: &'static str, typ: MessageType) -> Result<P, Error> {
        let reply = self.exchange(op, Ok(Message::query(&self.options(), typ)))?;
        reply
            .decode_payload::<P>()
            .map_err(|e| self.context(op, e.into()))
    }

    fn apply(&mut self, state: LightState) {
        self.color = Some(state.color);
        self.power = state.power;
        self.label = state.label.0;
    }

    /// Refreshes everything we know about the device, one query at a time.
    ///
    /// `connected` is cleared first and only set again once every query has been answered.  The
    /// first failure stops the refresh; fields refreshed before it keep their new values.
    pub fn update(&mut self, catalog: &ProductCatalog) -> Result<(), Error> {
        self.connected = false;

        let state: LightState = self.query("refreshing state", MessageType::LightGet)?;
        self.apply(state);

        let group: GroupState = self.query("refreshing group", MessageType::GetGroup)?;
        self.group = Some(Group {
            id: group.group,
            label: group.label.0,
        });

        let stats: InfoState = self.query("refreshing info", MessageType::GetInfo)?;
        self.info = Some(Info {
            time: stats.time,
            up_time: stats.uptime,
            down_time: stats.downtime,
        });

        let location: LocationState = self.query("refreshing location", MessageType::GetLocation)?;
        self.location = Some(Location {
            id: location.location,
            label: location.label.0,
        });

        let version: VersionState = self.query("refreshing version", MessageType::GetVersion)?;
        self.product = catalog.get(version.product).map(|p| Product {
            version: version.version,
            ..p.clone()
        });
        if self.product.is_none() {
            debug!("{}: product {} is not in the catalog", self.name(), version.product);
        }

        self.connected = true;
        info!("Refreshed {} ({})", self.name(), self.label);
        Ok(())
    }

    /// Applies label, then power, then color.  Each is its own round trip; the first failure
    /// stops the rest and nothing already applied is rolled back.
    pub fn set_state(&mut self, state: &State, duration: u32) -> Result<(), Error> {
        if let Some(label) = state.label.as_deref().filter(|l| !l.is_empty()) {
            self.set_label(label)?;
        }
        if let Some(power) = state.power {
            self.set_power(power)?;
        }
        if let Some(color) = state.color {
            self.set_hsbk(color, duration)?;
        }
        Ok(())
    }

    pub fn set_label(&mut self, label: &str) -> Result<(), Error> {
        self.exchange("setting label", Message::set_label(&self.options(), label))?;
        self.label = Label::new(label).0;
        Ok(())
    }

    pub fn set_power(&mut self, power: Power) -> Result<(), Error> {
        self.exchange("setting power", Message::set_power(&self.options(), power))?;
        self.power = power;
        Ok(())
    }

    /// Sets the color over `duration` milliseconds and keeps the state the device answers with.
    pub fn set_hsbk(&mut self, color: HSBK, duration: u32) -> Result<(), Error> {
        self.set_color("setting color", color, duration)
    }

    /// Turns a lit device off, anything else on at `max_brightness`.
    ///
    /// A device counts as lit when it is powered and its brightness is above zero.
    pub fn toggle(&mut self, max_brightness: u16, duration: u32) -> Result<(), Error> {
        let lit = self.power == Power::On && self.color.map_or(false, |c| c.brightness > 0);
        if lit {
            self.set_color("turning off", HSBK::OFF, duration)
        } else {
            let on = HSBK {
                brightness: max_brightness,
                ..HSBK::ON
            };
            self.set_color("turning on", on, duration)
        }
    }

    fn set_color(&mut self, op: &'static str, color: HSBK, duration: u32) -> Result<(), Error> {
        let reply = self.exchange(op, Message::set_color(&self.options(), color, duration))?;
        let state = reply
            .decode_payload::<LightState>()
            .map_err(|e| self.context(op, e.into()))?;
        self.apply(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::ErrorKind;

    fn device(transport: Scripted) -> Device {
        Device::new("d073d5000001", Some("127.0.0.1".into()), Some(56700), Protocol::Udp)
            .with_source(1234)
            .with_transport(Box::new(transport))
    }

    fn sent_color(log: &[Vec<u8>], index: usize) -> HSBK {
        let msg = Message::unpack(&log[index]).unwrap();
        assert_eq!(msg.message_type(), MessageType::LightSetColor);
        let p = &msg.payload;
        let word = |i: usize| u16::from_le_bytes([p[i], p[i + 1]]);
        HSBK {
            hue: word(1),
            saturation: word(3),
            brightness: word(5),
            kelvin: word(7),
        }
    }

    #[test]
    fn full_refresh() {
        let c = HSBK {
            hue: 100,
            saturation: 200,
            brightness: 300,
            kelvin: 3500,
        };
        let transport = Scripted::ok(refresh_replies(c, 0xFFFF, "Kitchen", "Downstairs", "Home"));
        let log = transport.log();
        let mut d = device(transport);

        d.update(&ProductCatalog::builtin()).unwrap();

        assert!(d.connected);
        assert_eq!(d.color, Some(c));
        assert_eq!(d.power, Power::On);
        assert_eq!(d.label, "Kitchen");
        assert_eq!(d.group.as_ref().unwrap().label, "Downstairs");
        assert_eq!(d.group.as_ref().unwrap().id, Ident([1; 16]));
        assert_eq!(d.location.as_ref().unwrap().label, "Home");
        let info = d.info.unwrap();
        assert_eq!(info.up_time, 3_600_000_000_000);
        assert_eq!(info.clock().timestamp(), 1_500_000_000);
        let product = d.product.as_ref().unwrap();
        assert_eq!(product.name, "LIFX A19");
        assert_eq!(product.version, 3);

        assert_eq!(
            sent_types(&log),
            vec![
                MessageType::LightGet,
                MessageType::GetGroup,
                MessageType::GetInfo,
                MessageType::GetLocation,
                MessageType::GetVersion,
            ]
        );
        for packet in log.lock().iter() {
            let msg = Message::unpack(packet).unwrap();
            assert_eq!(msg.header.source(), 1234);
            assert!(msg.header.res_required());
            assert!(msg.header.frame().tagged());
        }
    }

    #[test]
    fn failed_group_query_keeps_state() {
        let transport = Scripted::new(vec![
            Ok(light_state(HSBK::ON, 0xFFFF, "Desk")),
            Err(timeout()),
        ]);
        let mut d = device(transport);

        let err = d.update(&ProductCatalog::builtin()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("refreshing group"));
        assert!(!d.connected);
        assert_eq!(d.label, "Desk");
        assert_eq!(d.color, Some(HSBK::ON));
        assert!(d.group.is_none());
    }

    #[test]
    fn short_reply_is_rejected() {
        let mut short = light_state(HSBK::ON, 0xFFFF, "Desk");
        short.truncate(60);
        short[0] = 60;
        let mut d = device(Scripted::ok(vec![short]));

        let err = d.update(&ProductCatalog::builtin()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(d.color.is_none());
    }

    #[test]
    fn unexpected_reply_type() {
        let mut d = device(Scripted::ok(vec![group_state(1, "Desk")]));
        let err = d.update(&ProductCatalog::builtin()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn unknown_product() {
        let mut replies = refresh_replies(HSBK::ON, 0xFFFF, "Desk", "g", "l");
        replies[4] = version_state(4242, 1);
        let mut d = device(Scripted::ok(replies));

        d.update(&ProductCatalog::builtin()).unwrap();
        assert!(d.connected);
        assert!(d.product.is_none());
    }

    #[test]
    fn toggle_lit_device_turns_off() {
        let transport = Scripted::ok(vec![light_state(HSBK::OFF, 0xFFFF, "Desk")]);
        let log = transport.log();
        let mut d = device(transport);
        d.power = Power::On;
        d.color = Some(HSBK::ON);

        d.toggle(30000, 0).unwrap();
        assert_eq!(sent_color(&log.lock(), 0), HSBK::OFF);
        assert_eq!(d.color, Some(HSBK::OFF));
    }

    #[test]
    fn toggle_dark_device_turns_on() {
        let on = HSBK {
            brightness: 30000,
            ..HSBK::ON
        };
        let transport = Scripted::ok(vec![light_state(on, 0xFFFF, "Desk")]);
        let log = transport.log();
        let mut d = device(transport);
        d.power = Power::Off;

        d.toggle(30000, 0).unwrap();
        assert_eq!(
            sent_color(&log.lock(), 0),
            HSBK {
                hue: 65535,
                saturation: 65535,
                brightness: 30000,
                kelvin: 65535
            }
        );
        assert_eq!(d.power, Power::On);
        assert_eq!(d.color, Some(on));
    }

    #[test]
    fn toggle_powered_but_dim_turns_on() {
        let transport = Scripted::ok(vec![light_state(HSBK::ON, 0xFFFF, "Desk")]);
        let log = transport.log();
        let mut d = device(transport);
        d.power = Power::On;
        d.color = Some(HSBK::OFF);

        d.toggle(1000, 0).unwrap();
        assert_eq!(sent_color(&log.lock(), 0).brightness, 1000);
    }

    #[test]
    fn set_state_in_order() {
        let transport = Scripted::ok(vec![
            reply(MessageType::StateLabel, Vec::new()),
            reply(MessageType::StatePower, Vec::new()),
            light_state(HSBK::ON, 0xFFFF, "Porch"),
        ]);
        let log = transport.log();
        let mut d = device(transport);

        let state = State {
            color: Some(HSBK::ON),
            power: Some(Power::On),
            label: Some("Porch".into()),
        };
        d.set_state(&state, 500).unwrap();

        assert_eq!(
            sent_types(&log),
            vec![
                MessageType::SetLabel,
                MessageType::SetPower,
                MessageType::LightSetColor,
            ]
        );
        assert_eq!(d.label, "Porch");
        assert_eq!(d.power, Power::On);
        assert_eq!(d.color, Some(HSBK::ON));
    }

    #[test]
    fn set_state_stops_at_first_failure() {
        let transport = Scripted::new(vec![
            Ok(reply(MessageType::StateLabel, Vec::new())),
            Err(timeout()),
        ]);
        let log = transport.log();
        let mut d = device(transport);

        let state = State {
            color: Some(HSBK::ON),
            power: Some(Power::On),
            label: Some("Porch".into()),
        };
        let err = d.set_state(&state, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("setting power"));
        assert_eq!(d.label, "Porch");
        assert_eq!(d.power, Power::Off);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn empty_label_is_skipped() {
        let transport = Scripted::ok(vec![reply(MessageType::StatePower, Vec::new())]);
        let log = transport.log();
        let mut d = device(transport);

        let state = State {
            power: Some(Power::On),
            label: Some(String::new()),
            ..State::default()
        };
        d.set_state(&state, 0).unwrap();
        assert_eq!(sent_types(&log), vec![MessageType::SetPower]);
    }

    #[test]
    fn missing_address() {
        let mut d = Device::new("d073d5000001", None, Some(56700), Protocol::Udp);
        let err = d.update(&ProductCatalog::builtin()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);

        let mut d = Device::new("d073d5000001", Some("127.0.0.1".into()), None, Protocol::Udp);
        let err = d.set_power(Power::On).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn targeted_requests_are_untagged() {
        let transport = Scripted::ok(vec![reply(MessageType::StatePower, Vec::new())]);
        let log = transport.log();
        let mut d = device(transport).with_target(Some([0xd0, 0x73, 0xd5, 0, 0, 1, 0, 0]));

        d.set_power(Power::On).unwrap();
        let msg = Message::unpack(&log.lock()[0]).unwrap();
        assert!(!msg.header.frame().tagged());
        assert_eq!(msg.header.target(), [0xd0, 0x73, 0xd5, 0, 0, 1, 0, 0]);
    }
}
