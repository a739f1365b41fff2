//! A scripted transport and reply builders shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use horus_core::{Header, Message, MessageType, HSBK};
use parking_lot::Mutex;

use crate::transport::{Transport, TransportError};

/// Answers each request with the next scripted reply, and remembers what was sent.
///
/// Once the script runs out every request times out.
pub struct Scripted {
    replies: VecDeque<Result<Vec<u8>, TransportError>>,
    pub sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Scripted {
    pub fn new(replies: Vec<Result<Vec<u8>, TransportError>>) -> Scripted {
        Scripted {
            replies: replies.into(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok(replies: Vec<Vec<u8>>) -> Scripted {
        Scripted::new(replies.into_iter().map(Ok).collect())
    }

    /// A handle on the raw requests seen so far.
    pub fn log(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.sent)
    }
}

impl Transport for Scripted {
    fn send_with_deadline(
        &mut self,
        _host: &str,
        _port: u16,
        packet: &[u8],
        deadline: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        self.sent.lock().push(packet.to_vec());
        self.replies.pop_front().unwrap_or(Err(TransportError::Timeout {
            addr: ([127, 0, 0, 1], 56700).into(),
            deadline,
        }))
    }
}

pub fn timeout() -> TransportError {
    TransportError::Timeout {
        addr: ([127, 0, 0, 1], 56700).into(),
        deadline: Duration::from_secs(2),
    }
}

pub fn reply(typ: MessageType, payload: Vec<u8>) -> Vec<u8> {
    Message::new(Header::builder(typ).build(), payload)
        .pack()
        .unwrap()
}

fn label(s: &str) -> Vec<u8> {
    let mut v = s.as_bytes().to_vec();
    v.resize(32, 0);
    v
}

fn color(c: HSBK) -> Vec<u8> {
    [c.hue, c.saturation, c.brightness, c.kelvin]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

pub fn light_state(c: HSBK, power: u16, name: &str) -> Vec<u8> {
    let mut v = color(c);
    v.extend_from_slice(&[0, 0]);
    v.extend_from_slice(&power.to_le_bytes());
    v.extend(label(name));
    v.extend_from_slice(&[0; 8]);
    reply(MessageType::LightState, v)
}

fn ident_state(typ: MessageType, id: u8, name: &str) -> Vec<u8> {
    let mut v = vec![id; 16];
    v.extend(label(name));
    v.extend_from_slice(&0u64.to_le_bytes());
    reply(typ, v)
}

pub fn group_state(id: u8, name: &str) -> Vec<u8> {
    ident_state(MessageType::StateGroup, id, name)
}

pub fn location_state(id: u8, name: &str) -> Vec<u8> {
    ident_state(MessageType::StateLocation, id, name)
}

pub fn info_state(time: u64, uptime: u64, downtime: u64) -> Vec<u8> {
    let mut v = time.to_le_bytes().to_vec();
    v.extend_from_slice(&uptime.to_le_bytes());
    v.extend_from_slice(&downtime.to_le_bytes());
    reply(MessageType::StateInfo, v)
}

pub fn version_state(product: u32, version: u32) -> Vec<u8> {
    let mut v = 1u32.to_le_bytes().to_vec();
    v.extend_from_slice(&product.to_le_bytes());
    v.extend_from_slice(&version.to_le_bytes());
    reply(MessageType::StateVersion, v)
}

/// The five replies of a successful refresh.
pub fn refresh_replies(c: HSBK, power: u16, name: &str, group: &str, location: &str) -> Vec<Vec<u8>> {
    vec![
        light_state(c, power, name),
        group_state(1, group),
        info_state(1_500_000_000_000_000_000, 3_600_000_000_000, 0),
        location_state(2, location),
        version_state(27, 3),
    ]
}

/// Message types of the requests a transport saw.
pub fn sent_types(log: &Arc<Mutex<Vec<Vec<u8>>>>) -> Vec<MessageType> {
    log.lock()
        .iter()
        .map(|p| Message::unpack(p).unwrap().message_type())
        .collect()
}
