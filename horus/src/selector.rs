//! Selectors pick which configured devices a request is for.
//!
//! The grammar is `name` for static selectors (only `all` today) and `name:value` for dynamic
//! ones, e.g. `label:kitchen` or `group:Downstairs`.  The empty string means `all`.

use std::fmt;
use std::str::FromStr;

use crate::device::Device;
use crate::registry::{Registry, SharedDevice};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    All,
    Label,
    Uuid,
    GroupId,
    Group,
    LocationId,
    Location,
    SceneId,
}

impl SelectorKind {
    pub const ALL: [SelectorKind; 8] = [
        SelectorKind::All,
        SelectorKind::Label,
        SelectorKind::Uuid,
        SelectorKind::GroupId,
        SelectorKind::Group,
        SelectorKind::LocationId,
        SelectorKind::Location,
        SelectorKind::SceneId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SelectorKind::All => "all",
            SelectorKind::Label => "label",
            SelectorKind::Uuid => "uuid",
            SelectorKind::GroupId => "group_id",
            SelectorKind::Group => "group",
            SelectorKind::LocationId => "location_id",
            SelectorKind::Location => "location",
            SelectorKind::SceneId => "scene_id",
        }
    }

    /// Dynamic selectors need a value to match against.
    pub fn is_dynamic(self) -> bool {
        self != SelectorKind::All
    }

    pub fn from_name(name: &str) -> Option<SelectorKind> {
        SelectorKind::ALL.iter().copied().find(|k| k.name() == name)
    }
}

/// A parsed selector.  Static selectors never carry a value and dynamic ones always carry a
/// non-empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    kind: SelectorKind,
    value: Option<String>,
}

impl Selector {
    pub fn all() -> Selector {
        Selector {
            kind: SelectorKind::All,
            value: None,
        }
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn parse(s: &str) -> Result<Selector, Error> {
        if s.is_empty() {
            return Ok(Selector::all());
        }

        let lookup = |name: &str| {
            SelectorKind::from_name(name).ok_or_else(|| Error::NotFound(format!("selector {:?}", name)))
        };

        match s.split(':').collect::<Vec<_>>().as_slice() {
            [name] => {
                let kind = lookup(*name)?;
                if kind.is_dynamic() {
                    return Err(Error::Malformed(format!("selector {:?} without a value", s)));
                }
                Ok(Selector { kind, value: None })
            }
            [name, value] => {
                let kind = lookup(*name)?;
                if !kind.is_dynamic() {
                    return Err(Error::Malformed(format!(
                        "selector {:?} with a value",
                        s
                    )));
                }
                if value.is_empty() {
                    return Err(Error::Malformed(format!("selector {:?} with an empty value", s)));
                }
                Ok(Selector {
                    kind,
                    value: Some((*value).to_owned()),
                })
            }
            _ => Err(Error::Malformed(format!("selector {:?}", s))),
        }
    }

    /// The devices of `registry` this selector picks, in registry order.
    pub fn resolve(&self, registry: &Registry) -> Result<Vec<SharedDevice>, Error> {
        if registry.is_empty() {
            return Err(Error::Unprovisioned("device registry".to_owned()));
        }

        let found: Vec<SharedDevice> = match self.kind {
            SelectorKind::All => registry.devices().to_vec(),
            SelectorKind::GroupId | SelectorKind::LocationId | SelectorKind::SceneId => {
                return Err(Error::NotImplemented(format!("selector {:?}", self.kind.name())));
            }
            _ => registry
                .devices()
                .iter()
                .filter(|d| self.matches(&d.lock()))
                .cloned()
                .collect(),
        };

        if found.is_empty() {
            return Err(Error::NotFound(format!("device matching {}", self)));
        }
        Ok(found)
    }

    fn matches(&self, device: &Device) -> bool {
        match (&self.kind, &self.value) {
            (SelectorKind::Label, Some(v)) => device.label == *v,
            (SelectorKind::Uuid, Some(v)) => device.uuid == *v,
            (SelectorKind::Group, Some(v)) => device.group.as_ref().map_or(false, |g| g.label == *v),
            (SelectorKind::Location, Some(v)) => device.location.as_ref().map_or(false, |l| l.label == *v),
            _ => false,
        }
    }
}

impl Default for Selector {
    fn default() -> Selector {
        Selector::all()
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Selector, Error> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}:{}", self.kind.name(), v),
            None => write!(f, "{}", self.kind.name()),
        }
    }
}
