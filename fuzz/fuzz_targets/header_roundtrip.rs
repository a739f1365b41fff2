#![no_main]
use libfuzzer_sys::fuzz_target;

use horus_core::Header;

fuzz_target!(|header: Header| {
    let packed = header.pack().unwrap();
    let unpacked = Header::unpack(&packed).unwrap();
    assert_eq!(header, unpacked);
});
