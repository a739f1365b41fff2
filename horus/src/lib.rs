//!
//! A library for controlling the LIFX lights listed in a static configuration.
//!
//! There are a few levels you can use:
//!
//!  * [horus_core] speaks the low-level LIFX protocol: headers, messages and typed payloads.
//!  * [Device] owns one light, its last known state and its transport client.  It can refresh
//!  itself and apply changes.
//!  * [Registry] holds every configured device, and a [Selector] picks some of them.
//!  * [Controller] ties it together: refresh, select, then read, set or toggle.

use thiserror::Error;

pub mod config;
pub mod controller;
pub mod device;
pub mod products;
pub mod registry;
pub mod selector;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError, DeviceConfig};
pub use controller::{Controller, Outcome};
pub use device::{Device, Group, Info, Location, State};
pub use horus_core::{Power, HSBK};
pub use products::{Capabilities, Product, ProductCatalog};
pub use registry::{Registry, SharedDevice};
pub use selector::{Selector, SelectorKind};
pub use transport::{Protocol, Transport, TransportError, Udp};

/// The category of an [Error], stable across the context it picked up on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Malformed,
    NotFound,
    NotImplemented,
    Unprovisioned,
    Transport,
    Protocol,
}

#[derive(Error, Debug)]
pub enum Error {
    /// The input (a selector, a setting, a device entry) is not valid.
    #[error("{0} is not valid")]
    Malformed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} not implemented")]
    NotImplemented(String),

    /// Nothing has been configured yet.
    #[error("{0} not provisioned")]
    Unprovisioned(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A reply could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An error that happened while talking to one device.
    #[error("{op} on {device}: {source}")]
    Device {
        op: &'static str,
        device: String,
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Malformed(_) => ErrorKind::Malformed,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotImplemented(_) => ErrorKind::NotImplemented,
            Error::Unprovisioned(_) => ErrorKind::Unprovisioned,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Device { source, .. } => source.kind(),
        }
    }
}

impl From<horus_core::Error> for Error {
    fn from(e: horus_core::Error) -> Error {
        match e {
            horus_core::Error::Malformed(what) => Error::Malformed(what),
            horus_core::Error::UnknownMessageType(code) => {
                Error::NotFound(format!("message type {}", code))
            }
            horus_core::Error::ProtocolError(what) => Error::Protocol(what),
            horus_core::Error::Io(e) => Error::Protocol(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_survives_device_context() {
        let e = Error::Device {
            op: "refreshing group",
            device: "d073d5000001".into(),
            source: Box::new(Error::Protocol("short reply".into())),
        };
        assert_eq!(e.kind(), ErrorKind::Protocol);
        let text = e.to_string();
        assert!(text.contains("refreshing group"));
        assert!(text.contains("d073d5000001"));
        assert!(text.contains("short reply"));
    }

    #[test]
    fn codec_errors_map_to_kinds() {
        let e: Error = horus_core::Error::UnknownMessageType(9999).into();
        assert_eq!(e.kind(), ErrorKind::NotFound);
        let e: Error = horus_core::Error::ProtocolError("bad".into()).into();
        assert_eq!(e.kind(), ErrorKind::Protocol);
        let e: Error = horus_core::Error::Malformed("header".into()).into();
        assert_eq!(e.kind(), ErrorKind::Malformed);
    }
}
