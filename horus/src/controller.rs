//! The three operations the outside world asks for: read, set state, toggle.

use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::config::Config;
use crate::device::{Device, State};
use crate::products::ProductCatalog;
use crate::registry::{self, Registry, SharedDevice};
use crate::selector::{Selector, SelectorKind};
use crate::Error;

/// What happened to one device during a set-state or toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub uuid: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Controller {
    registry: Registry,
    catalog: ProductCatalog,
    max_brightness: u16,
}

impl Controller {
    pub fn new(registry: Registry, catalog: ProductCatalog, max_brightness: u16) -> Controller {
        Controller {
            registry,
            catalog,
            max_brightness,
        }
    }

    pub fn from_config(config: &Config, catalog: ProductCatalog) -> Controller {
        Controller::new(Registry::from_config(config), catalog, config.max_brightness)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses the selector, refreshes, then resolves.  Each selected device comes back with the
    /// result of its own refresh.
    ///
    /// A `uuid` selector names configured devices, so it resolves first and only those devices
    /// are refreshed.  Every other selector matches on what the devices report and needs the
    /// whole registry refreshed before it resolves.
    fn select(&self, selector: &str) -> Result<Vec<Selected>, Error> {
        let selector = Selector::parse(selector)?;

        if selector.kind() == SelectorKind::Uuid {
            let devices = selector.resolve(&self.registry)?;
            let refreshed = registry::refresh(&devices, &self.catalog);
            return Ok(devices.into_iter().zip(refreshed).collect());
        }

        let all = self.registry.devices();
        let mut refreshed: Vec<_> = registry::refresh(all, &self.catalog)
            .into_iter()
            .map(Some)
            .collect();
        let devices = selector.resolve(&self.registry)?;
        Ok(devices
            .into_iter()
            .map(|device| {
                let result = all
                    .iter()
                    .position(|d| Arc::ptr_eq(d, &device))
                    .and_then(|i| refreshed[i].take())
                    .unwrap_or(Ok(()));
                (device, result)
            })
            .collect())
    }

    /// The selected devices, freshly refreshed.  Fails with the first refresh error among them.
    pub fn read_devices(&self, selector: &str) -> Result<Vec<SharedDevice>, Error> {
        self.select(selector)?
            .into_iter()
            .map(|(device, refreshed)| refreshed.map(|()| device))
            .collect()
    }

    /// Applies `state` to every selected device over `duration` milliseconds.
    pub fn set_state(&self, selector: &str, state: &State, duration: u32) -> Result<Vec<Outcome>, Error> {
        let selected = self.select(selector)?;
        Ok(for_each(selected, |d| d.set_state(state, duration)))
    }

    /// Toggles every selected device, turning lights on at the configured brightness.
    pub fn toggle(&self, selector: &str, duration: u32) -> Result<Vec<Outcome>, Error> {
        let selected = self.select(selector)?;
        let max_brightness = self.max_brightness;
        Ok(for_each(selected, |d| d.toggle(max_brightness, duration)))
    }
}

/// A selected device and how its refresh went.
type Selected = (SharedDevice, Result<(), Error>);

/// Runs `op` on every device that refreshed.  A device that did not keeps its refresh error as
/// its outcome and is left alone.
fn for_each<F>(selected: Vec<Selected>, mut op: F) -> Vec<Outcome>
where
    F: FnMut(&mut Device) -> Result<(), Error>,
{
    selected
        .into_iter()
        .map(|(device, refreshed)| {
            let mut device = device.lock();
            let result = match refreshed {
                Ok(()) => op(&mut *device).map_err(|e| {
                    warn!("{}", e);
                    e
                }),
                Err(e) => Err(e),
            };
            Outcome {
                uuid: device.uuid.clone(),
                label: device.label.clone(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect()
}
