//! This crate provides the message codec horus uses to talk to LIFX lights over the LAN.
//!
//! More info about the protocol can be found here: https://lan.developer.lifx.com/
//!
//! Since this is a low-level library, it does not deal with issues like talking to the network,
//! caching light state, or waiting for replies.  That is done by the `horus` crate.
//!
//! # Layout
//!
//! A message is a 2-byte little-endian size, a fixed 34-byte [Header], then a payload whose
//! meaning depends on the header's [MessageType]:
//!
//! ```text
//! size[0:2] frame[2:4] source[4:8] target[8:16] reserved[16:22] control[22] sequence[23]
//! reserved[24:32] type[32:34] reserved[34:36] payload[36..]
//! ```
//!
//! # Reserved fields
//! Reserved bytes are always written as zero.  It's possible to receive packets with these fields
//! set to non-zero values, so they are ignored when decoding.  Be conservative in what you send,
//! and liberal in what you accept.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{self, Cursor};

/// Size in bytes of an encoded [Header].
pub const HEADER_SIZE: usize = 34;

/// Size in bytes of the length prefix that precedes every header.
pub const SIZE_PREFIX: usize = 2;

/// Labels are fixed-length on the wire.
pub const LABEL_SIZE: usize = 32;

/// Sequence number stamped on every request built by the [Message] factories.
pub const DEFAULT_SEQUENCE: u8 = 0x10;

/// Various message encoding/decoding errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The buffer handed to a decoder or encoder does not have the required shape.
    #[error("malformed buffer: {0}")]
    Malformed(String),

    /// This error means we were unable to parse a raw message because its type is unknown.
    ///
    /// LIFX devices are known to send messages that are not officially documented, so this error
    /// type does not necessarily represent a bug.
    #[error("unknown message type {0}")]
    UnknownMessageType(u16),

    /// This error means one of the message fields contains an invalid or unsupported value, or
    /// that a reply is too short to hold the fields it should carry.
    ///
    /// The inner string is a description of the error.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

macro_rules! message_types {
    ( $( $(#[$m:meta])* $name:ident = $num:literal ),* $(,)? ) => {
        /// Message type codes known to this library.
        ///
        /// Note that other message types exist, but are not officially documented (and so are not
        /// available here).
        #[repr(u16)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
        pub enum MessageType {
            $( $(#[$m])* $name = $num, )*
        }

        impl MessageType {
            /// Every known message type, in code order.
            pub const ALL: &'static [MessageType] = &[ $( MessageType::$name ),* ];
        }

        impl TryFrom<u16> for MessageType {
            type Error = Error;

            fn try_from(val: u16) -> Result<MessageType, Error> {
                match val {
                    $( $num => Ok(MessageType::$name), )*
                    x => Err(Error::UnknownMessageType(x)),
                }
            }
        }
    };
}

message_types! {
    /// Sent by a client to acquire responses from all devices on the local network.
    GetService = 2,
    StateService = 3,
    GetHostInfo = 12,
    StateHostInfo = 13,
    GetHostFirmware = 14,
    StateHostFirmware = 15,
    GetWifiInfo = 16,
    StateWifiInfo = 17,
    GetWifiFirmware = 18,
    StateWifiFirmware = 19,
    GetPower = 20,
    /// Set device power level.  The payload is 0xFFFF (on) or 0x0000 (off).
    SetPower = 21,
    StatePower = 22,
    GetLabel = 23,
    /// Set the device label text.  The payload is a zero-padded 32 byte string.
    SetLabel = 24,
    StateLabel = 25,
    /// Get the hardware version.  Causes the device to transmit a [MessageType::StateVersion].
    GetVersion = 32,
    StateVersion = 33,
    /// Get run-time information.  Causes the device to transmit a [MessageType::StateInfo].
    GetInfo = 34,
    StateInfo = 35,
    /// Response to any message sent with ack_required set.
    Acknowledgement = 45,
    /// Ask the bulb to return its location.  Causes the device to transmit a
    /// [MessageType::StateLocation].
    GetLocation = 48,
    SetLocation = 49,
    StateLocation = 50,
    /// Ask the bulb to return its group membership.  Causes the device to transmit a
    /// [MessageType::StateGroup].
    GetGroup = 51,
    SetGroup = 52,
    StateGroup = 53,
    EchoRequest = 58,
    EchoResponse = 59,
    /// Sent by a client to obtain the light state.  Causes the device to transmit a
    /// [MessageType::LightState].
    LightGet = 101,
    /// Sent by a client to change the light color.
    LightSetColor = 102,
    SetWaveform = 103,
    /// Sent by a device to provide the current light state.
    LightState = 107,
    LightGetPower = 116,
    LightSetPower = 117,
    LightStatePower = 118,
}

impl MessageType {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// The first two bytes of a [Header].
///
/// The frame flags whether the message is tagged (sent to all devices) and/or addressable.  The
/// low nibble of the second byte carries the protocol number and is always `0x4`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Frame(pub [u8; 2]);

impl Frame {
    pub const UNTAGGED_UNADDRESSABLE: Frame = Frame([0x00, 0x04]);
    pub const UNTAGGED_ADDRESSABLE: Frame = Frame([0x00, 0x14]);
    pub const TAGGED_UNADDRESSABLE: Frame = Frame([0x00, 0x24]);
    pub const TAGGED_ADDRESSABLE: Frame = Frame([0x00, 0x34]);

    pub fn new(tagged: bool, addressable: bool) -> Frame {
        let mut b = 0x04;
        if addressable {
            b |= 0x10;
        }
        if tagged {
            b |= 0x20;
        }
        Frame([0x00, b])
    }

    pub fn tagged(&self) -> bool {
        self.0[1] & 0x20 > 0
    }

    pub fn addressable(&self) -> bool {
        self.0[1] & 0x10 > 0
    }
}

impl std::default::Default for Frame {
    fn default() -> Frame {
        Frame::TAGGED_ADDRESSABLE
    }
}

/// Packs the acknowledgement and response flags into the header control byte.
fn encode_control(ack_required: bool, res_required: bool) -> u8 {
    match (ack_required, res_required) {
        (false, false) => 0x00,
        (false, true) => 0x01,
        (true, false) => 0x10,
        (true, true) => 0x11,
    }
}

/// Inverse of [encode_control].  Only the four values it produces are accepted.
fn decode_control(b: u8) -> Result<(bool, bool), Error> {
    match b {
        0x00 => Ok((false, false)),
        0x01 => Ok((false, true)),
        0x10 => Ok((true, false)),
        0x11 => Ok((true, true)),
        x => Err(Error::ProtocolError(format!(
            "Unknown ack/res control byte {:#04x}",
            x
        ))),
    }
}

/// The fixed 34-byte header carried by every message.
///
/// Build one with [Header::builder].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Header {
    frame: Frame,
    source: u32,
    target: [u8; 8],
    ack_required: bool,
    res_required: bool,
    sequence: u8,
    message_type: MessageType,
}

impl Header {
    pub fn builder(message_type: MessageType) -> HeaderBuilder {
        HeaderBuilder {
            frame: Frame::default(),
            source: 0,
            target: [0; 8],
            ack_required: false,
            res_required: false,
            sequence: 0,
            message_type,
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Unique client identifier.  Replies carry the source of the request they answer.
    pub fn source(&self) -> u32 {
        self.source
    }

    /// Device identifier.  All zeros means the message is not addressed to a single device.
    pub fn target(&self) -> [u8; 8] {
        self.target
    }

    pub fn ack_required(&self) -> bool {
        self.ack_required
    }

    pub fn res_required(&self) -> bool {
        self.res_required
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Packs this header into exactly [HEADER_SIZE] bytes.
    pub fn pack(&self) -> Result<Vec<u8>, Error> {
        let mut v = Vec::with_capacity(HEADER_SIZE);
        v.extend_from_slice(&self.frame.0);
        v.write_u32::<LittleEndian>(self.source)?;
        v.extend_from_slice(&self.target);
        v.extend_from_slice(&[0; 6]);
        v.write_u8(encode_control(self.ack_required, self.res_required))?;
        v.write_u8(self.sequence)?;
        v.extend_from_slice(&[0; 8]);
        v.write_u16::<LittleEndian>(self.message_type.code())?;
        v.extend_from_slice(&[0; 2]);
        debug_assert_eq!(v.len(), HEADER_SIZE);
        Ok(v)
    }

    /// Unpacks a header from exactly [HEADER_SIZE] bytes.
    pub fn unpack(v: &[u8]) -> Result<Header, Error> {
        if v.len() != HEADER_SIZE {
            return Err(Error::Malformed(format!(
                "a header is {} bytes, got {}",
                HEADER_SIZE,
                v.len()
            )));
        }
        let mut c = Cursor::new(v);

        let frame = Frame([c.read_u8()?, c.read_u8()?]);
        let source = c.read_u32::<LittleEndian>()?;
        let mut target = [0; 8];
        for slot in &mut target {
            *slot = c.read_u8()?;
        }
        c.set_position(20);
        let (ack_required, res_required) = decode_control(c.read_u8()?)?;
        let sequence = c.read_u8()?;
        c.set_position(30);
        let message_type = MessageType::try_from(c.read_u16::<LittleEndian>()?)?;

        Ok(Header {
            frame,
            source,
            target,
            ack_required,
            res_required,
            sequence,
            message_type,
        })
    }
}

/// Accumulates header fields and yields an immutable [Header] from [HeaderBuilder::build].
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    frame: Frame,
    source: u32,
    target: [u8; 8],
    ack_required: bool,
    res_required: bool,
    sequence: u8,
    message_type: MessageType,
}

impl HeaderBuilder {
    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn source(mut self, source: u32) -> Self {
        self.source = source;
        self
    }

    pub fn target(mut self, target: [u8; 8]) -> Self {
        self.target = target;
        self
    }

    pub fn ack_required(mut self, required: bool) -> Self {
        self.ack_required = required;
        self
    }

    pub fn res_required(mut self, required: bool) -> Self {
        self.res_required = required;
        self
    }

    /// A sequence is only useful if an acknowledgement or a response is required.
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn build(self) -> Header {
        Header {
            frame: self.frame,
            source: self.source,
            target: self.target,
            ack_required: self.ack_required,
            res_required: self.res_required,
            sequence: self.sequence,
            message_type: self.message_type,
        }
    }
}

/// Lifx strings are fixed-length (32-bytes maximum)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Label(pub String);

impl Label {
    /// Constructs a new Label, truncating to 32 bytes on a character boundary.
    pub fn new(s: &str) -> Label {
        let mut end = s.len().min(LABEL_SIZE);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        Label(s[..end].to_owned())
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl std::cmp::PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A 16 byte group or location identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ident(pub [u8; 16]);

/// Bulb color (Hue-Saturation-Brightness-Kelvin)
///
/// # Notes:
///
/// When a light is displaying whites, saturation will be zero, hue will be ignored, and only
/// brightness and kelvin will matter.
///
/// Normal values for "kelvin" are from 2500 (warm/yellow) to 9000 (cool/blue)
///
/// When a light is displaying colors, kelvin is ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct HSBK {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl HSBK {
    /// Setting this color turns a light off.
    pub const OFF: HSBK = HSBK {
        hue: 0,
        saturation: 0,
        brightness: 0,
        kelvin: 0,
    };

    /// The canonical "on" color.  Toggling replaces its brightness.
    pub const ON: HSBK = HSBK {
        hue: 65535,
        saturation: 65535,
        brightness: 32767,
        kelvin: 65535,
    };

    pub fn describe(&self, short: bool) -> String {
        match short {
            true if self.saturation == 0 => format!("{}K", self.kelvin),
            true => format!(
                "{:.0}/{:.0}",
                (self.hue as f32 / 65535.0) * 360.0,
                self.saturation as f32 / 655.35
            ),
            false if self.saturation == 0 => format!(
                "{:.0}% White ({})",
                self.brightness as f32 / 655.35,
                describe_kelvin(self.kelvin)
            ),
            false => format!(
                "{:.0}% hue: {} sat: {}",
                self.brightness as f32 / 655.35,
                self.hue,
                self.saturation
            ),
        }
    }
}

/// Describe (in english words) the color temperature as given in kelvin.
///
/// These descriptions match the values shown in the LIFX mobile app.
pub fn describe_kelvin(k: u16) -> &'static str {
    match k {
        0..=2500 => "Ultra Warm",
        2501..=2700 => "Incandescent",
        2701..=3000 => "Warm",
        3001..=3200 => "Neutral Warm",
        3201..=3500 => "Neutral",
        3501..=4000 => "Cool",
        4001..=4500 => "Cool Daylight",
        4501..=5000 => "Soft Daylight",
        5001..=5500 => "Daylight",
        5501..=6000 => "Noon Daylight",
        6001..=6500 => "Bright Daylight",
        6501..=7000 => "Cloudy Daylight",
        7001..=7500 => "Blue Daylight",
        7501..=8000 => "Blue Overcast",
        8001..=8500 => "Blue Water",
        _ => "Blue Ice",
    }
}

/// Power status of a device.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    #[default]
    Off,
}

impl Power {
    /// The wire level: 65535 for on, 0 for off.
    pub fn level(self) -> u16 {
        match self {
            Power::On => 0xFFFF,
            Power::Off => 0x0000,
        }
    }

    /// Any level other than 65535 reads as off.
    pub fn from_level(level: u16) -> Power {
        if level == 0xFFFF {
            Power::On
        } else {
            Power::Off
        }
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Power::On => write!(f, "on"),
            Power::Off => write!(f, "off"),
        }
    }
}

trait LittleEndianWriter<T>: WriteBytesExt {
    fn write_val(&mut self, v: T) -> Result<(), io::Error>;
}

macro_rules! derive_writer {
{ $( $m:ident: $t:ty ),*} => {
    $(
        impl<T: WriteBytesExt> LittleEndianWriter<$t> for T {
            fn write_val(&mut self, v: $t) -> Result<(), io::Error> {
                self . $m ::<LittleEndian>(v)
            }
        }
    )*

}
}

derive_writer! { write_u32: u32, write_u16: u16, write_u64: u64 }

impl<T: WriteBytesExt> LittleEndianWriter<u8> for T {
    fn write_val(&mut self, v: u8) -> Result<(), io::Error> {
        self.write_u8(v)
    }
}

impl<T> LittleEndianWriter<&Label> for T
where
    T: WriteBytesExt,
{
    fn write_val(&mut self, v: &Label) -> Result<(), io::Error> {
        let bytes = v.0.as_bytes();
        for idx in 0..LABEL_SIZE {
            self.write_u8(bytes.get(idx).copied().unwrap_or(0))?;
        }
        Ok(())
    }
}

impl<T> LittleEndianWriter<HSBK> for T
where
    T: WriteBytesExt,
{
    fn write_val(&mut self, v: HSBK) -> Result<(), io::Error> {
        self.write_val(v.hue)?;
        self.write_val(v.saturation)?;
        self.write_val(v.brightness)?;
        self.write_val(v.kelvin)?;
        Ok(())
    }
}

trait LittleEndianReader<T> {
    fn read_val(&mut self) -> Result<T, io::Error>;
}

macro_rules! derive_reader {
{ $( $m:ident: $t:ty ),*} => {
    $(
        impl<T: ReadBytesExt> LittleEndianReader<$t> for T {
            fn read_val(&mut self) -> Result<$t, io::Error> {
                self . $m ::<LittleEndian>()
            }
        }
    )*

}
}

derive_reader! { read_u32: u32, read_u16: u16, read_u64: u64 }

impl<R: ReadBytesExt> LittleEndianReader<u8> for R {
    fn read_val(&mut self) -> Result<u8, io::Error> {
        self.read_u8()
    }
}

impl<R: ReadBytesExt> LittleEndianReader<HSBK> for R {
    fn read_val(&mut self) -> Result<HSBK, io::Error> {
        let hue = self.read_val()?;
        let sat = self.read_val()?;
        let bri = self.read_val()?;
        let kel = self.read_val()?;
        Ok(HSBK {
            hue,
            saturation: sat,
            brightness: bri,
            kelvin: kel,
        })
    }
}

impl<R: ReadBytesExt> LittleEndianReader<Ident> for R {
    fn read_val(&mut self) -> Result<Ident, io::Error> {
        let mut val = [0; 16];
        self.read_exact(&mut val)?;
        Ok(Ident(val))
    }
}

impl<R: ReadBytesExt> LittleEndianReader<Label> for R {
    fn read_val(&mut self) -> Result<Label, io::Error> {
        let mut raw = [0; LABEL_SIZE];
        self.read_exact(&mut raw)?;
        let label = String::from_utf8_lossy(&raw);
        Ok(Label(label.trim_matches('\0').to_owned()))
    }
}

/// Who a request comes from and which device it is for.
///
/// See also the [Message] factories.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// If not `None`, this is the ID of the device you want to address.  Messages without a
    /// target are tagged.
    pub target: Option<[u8; 8]>,
    /// A unique client identifier, set once per process.
    ///
    /// If the source is non-zero, then the LIFX device with send a unicast message to the IP
    /// address/port of the client that sent the originating message.
    pub source: u32,
}

impl BuildOptions {
    /// Header shared by every request the factories build: response required, fixed sequence.
    fn request(&self, typ: MessageType) -> Header {
        Header::builder(typ)
            .frame(Frame::new(self.target.is_none(), true))
            .source(self.source)
            .target(self.target.unwrap_or([0; 8]))
            .res_required(true)
            .sequence(DEFAULT_SEQUENCE)
            .build()
    }
}

/// A header plus its payload.  This is what is sent and received via UDP packets.
///
/// To parse the payload of a reply, use [Message::decode_payload].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(header: Header, payload: Vec<u8>) -> Message {
        Message { header, payload }
    }

    /// A message with no payload, asking the device to respond.
    pub fn query(options: &BuildOptions, typ: MessageType) -> Message {
        Message::new(options.request(typ), Vec::new())
    }

    /// LightSetColor - 102
    ///
    /// `duration` is the color transition time in milliseconds.
    pub fn set_color(options: &BuildOptions, color: HSBK, duration: u32) -> Result<Message, Error> {
        let mut v = Vec::with_capacity(13);
        v.write_val(0u8)?;
        v.write_val(color)?;
        v.write_val(duration)?;
        Ok(Message::new(options.request(MessageType::LightSetColor), v))
    }

    /// SetPower - 21
    pub fn set_power(options: &BuildOptions, power: Power) -> Result<Message, Error> {
        let mut v = Vec::with_capacity(2);
        v.write_val(power.level())?;
        Ok(Message::new(options.request(MessageType::SetPower), v))
    }

    /// SetLabel - 24
    ///
    /// Labels longer than 32 bytes are truncated.
    pub fn set_label(options: &BuildOptions, label: &str) -> Result<Message, Error> {
        let mut v = Vec::with_capacity(LABEL_SIZE);
        v.write_val(&Label::new(label))?;
        Ok(Message::new(options.request(MessageType::SetLabel), v))
    }

    pub fn message_type(&self) -> MessageType {
        self.header.message_type()
    }

    /// The total size (in bytes) of the packed version of this message.
    pub fn packed_size(&self) -> usize {
        SIZE_PREFIX + HEADER_SIZE + self.payload.len()
    }

    /// Packs this message into some bytes that can be sent over the network.
    ///
    /// The size prefix is recomputed from the payload every time.
    pub fn pack(&self) -> Result<Vec<u8>, Error> {
        let size = u16::try_from(self.packed_size()).map_err(|_| {
            Error::Malformed(format!("a {} byte payload does not fit a message", self.payload.len()))
        })?;
        let mut v = Vec::with_capacity(self.packed_size());
        v.write_u16::<LittleEndian>(size)?;
        v.extend(self.header.pack()?);
        v.extend(&self.payload);
        Ok(v)
    }

    /// Given some bytes (generally read from a network socket), unpack the data into a `Message`.
    ///
    /// The declared size must match the buffer length exactly.
    pub fn unpack(v: &[u8]) -> Result<Message, Error> {
        if v.len() < SIZE_PREFIX + HEADER_SIZE {
            return Err(Error::ProtocolError(format!(
                "a message is at least {} bytes, got {}",
                SIZE_PREFIX + HEADER_SIZE,
                v.len()
            )));
        }
        let size = Cursor::new(v).read_u16::<LittleEndian>()? as usize;
        if size != v.len() {
            return Err(Error::ProtocolError(format!(
                "message declares {} bytes but {} were received",
                size,
                v.len()
            )));
        }
        let header = Header::unpack(&v[SIZE_PREFIX..SIZE_PREFIX + HEADER_SIZE])?;
        let payload = v[SIZE_PREFIX + HEADER_SIZE..].to_vec();
        Ok(Message { header, payload })
    }

    /// Tries to parse the payload, checking the message type and payload length first.
    pub fn decode_payload<P: Payload>(&self) -> Result<P, Error> {
        if self.message_type() != P::TYPE {
            return Err(Error::ProtocolError(format!(
                "expected a {:?} reply, got {:?}",
                P::TYPE,
                self.message_type()
            )));
        }
        if self.payload.len() < P::SIZE {
            return Err(Error::ProtocolError(format!(
                "{:?} payload is {} bytes, expected {}",
                P::TYPE,
                self.payload.len(),
                P::SIZE
            )));
        }
        let mut c = Cursor::new(&self.payload[..]);
        P::read(&mut c)
    }
}

/// A reply payload with a fixed layout.
///
/// Fields are read from documented offsets after the length has been validated by
/// [Message::decode_payload].
pub trait Payload: Sized {
    /// The message type this payload travels in.
    const TYPE: MessageType;
    /// Minimum payload length in bytes.
    const SIZE: usize;

    fn read(c: &mut Cursor<&[u8]>) -> Result<Self, Error>;
}

/// LightState - 107
///
/// `color[0:8] reserved[8:10] power[10:12] label[12:44] reserved[44:52]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightState {
    pub color: HSBK,
    pub power: Power,
    pub label: Label,
}

impl Payload for LightState {
    const TYPE: MessageType = MessageType::LightState;
    const SIZE: usize = 52;

    fn read(c: &mut Cursor<&[u8]>) -> Result<LightState, Error> {
        let color = c.read_val()?;
        c.set_position(10);
        let level: u16 = c.read_val()?;
        let label = c.read_val()?;
        Ok(LightState {
            color,
            power: Power::from_level(level),
            label,
        })
    }
}

/// StateGroup - 53
///
/// `group[0:16] label[16:48] updated_at[48:56]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupState {
    pub group: Ident,
    pub label: Label,
    /// UTC timestamp of last label update in nanoseconds
    pub updated_at: u64,
}

impl Payload for GroupState {
    const TYPE: MessageType = MessageType::StateGroup;
    const SIZE: usize = 56;

    fn read(c: &mut Cursor<&[u8]>) -> Result<GroupState, Error> {
        Ok(GroupState {
            group: c.read_val()?,
            label: c.read_val()?,
            updated_at: c.read_val()?,
        })
    }
}

/// StateLocation - 50
///
/// Same layout as [GroupState].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
    pub location: Ident,
    pub label: Label,
    pub updated_at: u64,
}

impl Payload for LocationState {
    const TYPE: MessageType = MessageType::StateLocation;
    const SIZE: usize = 56;

    fn read(c: &mut Cursor<&[u8]>) -> Result<LocationState, Error> {
        Ok(LocationState {
            location: c.read_val()?,
            label: c.read_val()?,
            updated_at: c.read_val()?,
        })
    }
}

/// StateInfo - 35
///
/// `time[0:8] uptime[8:16] downtime[16:24]`, all in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoState {
    /// current time (absolute time in nanoseconds since epoch)
    pub time: u64,
    /// time since last power on (relative time in nanoseconds)
    pub uptime: u64,
    /// last power off period (5 second accuracy, in nanoseconds)
    pub downtime: u64,
}

impl Payload for InfoState {
    const TYPE: MessageType = MessageType::StateInfo;
    const SIZE: usize = 24;

    fn read(c: &mut Cursor<&[u8]>) -> Result<InfoState, Error> {
        Ok(InfoState {
            time: c.read_val()?,
            uptime: c.read_val()?,
            downtime: c.read_val()?,
        })
    }
}

/// StateVersion - 33
///
/// `vendor[0:4] product[4:8] version[8:12]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionState {
    pub vendor: u32,
    pub product: u32,
    /// hardware version
    pub version: u32,
}

impl Payload for VersionState {
    const TYPE: MessageType = MessageType::StateVersion;
    const SIZE: usize = 12;

    fn read(c: &mut Cursor<&[u8]>) -> Result<VersionState, Error> {
        Ok(VersionState {
            vendor: c.read_val()?,
            product: c.read_val()?,
            version: c.read_val()?,
        })
    }
}
