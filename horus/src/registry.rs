use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;

use crate::config::Config;
use crate::device::Device;
use crate::products::ProductCatalog;
use crate::Error;

/// A device behind its own lock.  Every mutation of a device goes through it.
pub type SharedDevice = Arc<Mutex<Device>>;

/// Every configured device, in configuration order.
#[derive(Debug, Default)]
pub struct Registry {
    devices: Vec<SharedDevice>,
}

impl Registry {
    pub fn new(devices: Vec<Device>) -> Registry {
        Registry {
            devices: devices.into_iter().map(|d| Arc::new(Mutex::new(d))).collect(),
        }
    }

    /// One device per configured entry, all using the configured source id.
    pub fn from_config(config: &Config) -> Registry {
        Registry::new(config.lifx.iter().map(|d| d.to_device(config.source)).collect())
    }

    pub fn devices(&self) -> &[SharedDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Updates each device in turn.  A device that fails is logged and skipped; its error is
    /// returned with the others.
    pub fn refresh(&self, catalog: &ProductCatalog) -> Vec<Error> {
        refresh(&self.devices, catalog)
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}

/// Updates `devices` one at a time.  The results line up with `devices`.
pub fn refresh(devices: &[SharedDevice], catalog: &ProductCatalog) -> Vec<Result<(), Error>> {
    devices
        .iter()
        .map(|device| {
            let result = device.lock().update(catalog);
            if let Err(e) = &result {
                warn!("{}", e);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::transport::Protocol;
    use crate::ErrorKind;
    use horus_core::HSBK;

    #[test]
    fn refresh_collects_failures() {
        let good = Device::new("d073d5000001", Some("127.0.0.1".into()), Some(56700), Protocol::Udp)
            .with_transport(Box::new(Scripted::ok(refresh_replies(
                HSBK::ON,
                0xFFFF,
                "kitchen",
                "Downstairs",
                "Home",
            ))));
        let unreachable = Device::new("d073d5000002", Some("127.0.0.1".into()), Some(56700), Protocol::Udp)
            .with_transport(Box::new(Scripted::new(vec![Err(timeout())])));
        let unconfigured = Device::new("d073d5000003", None, None, Protocol::Udp);
        let registry = Registry::new(vec![good, unreachable, unconfigured]);

        let failures = registry.refresh(&ProductCatalog::builtin());
        let kinds: Vec<_> = failures.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![ErrorKind::Transport, ErrorKind::Malformed]);

        let connected: Vec<_> = registry.devices().iter().map(|d| d.lock().connected).collect();
        assert_eq!(connected, vec![true, false, false]);
        assert_eq!(registry.devices()[0].lock().label, "kitchen");
    }

    #[test]
    fn built_from_config() {
        let config = Config::from_yaml_str(
            r#"
source: 42
lifx:
  - uuid: d073d5000001
    label: kitchen
    address: 192.168.1.20
    port: 56700
  - uuid: d073d5000002
"#,
        )
        .unwrap();
        let registry = Registry::from_config(&config);
        assert_eq!(registry.len(), 2);
        let first = registry.devices()[0].lock();
        assert_eq!(first.label, "kitchen");
        assert_eq!(first.address.as_deref(), Some("192.168.1.20"));
        assert_eq!(first.port, Some(56700));
        assert!(!first.connected);
    }
}
