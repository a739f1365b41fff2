#![no_main]
use libfuzzer_sys::fuzz_target;

use horus_core::{
    GroupState, InfoState, LightState, LocationState, Message, VersionState,
};

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must never panic the decoder
    let msg = match Message::unpack(data) {
        Ok(msg) => msg,
        Err(_) => return,
    };

    // whatever decodes re-encodes to the same length
    let packed = msg.pack().unwrap();
    assert_eq!(packed.len(), data.len());
    assert_eq!(Message::unpack(&packed).unwrap(), msg);

    let _ = msg.decode_payload::<LightState>();
    let _ = msg.decode_payload::<GroupState>();
    let _ = msg.decode_payload::<LocationState>();
    let _ = msg.decode_payload::<InfoState>();
    let _ = msg.decode_payload::<VersionState>();
});
