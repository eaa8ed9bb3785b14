#![no_main]

use craft_protocol::PacketReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every read must fail cleanly on hostile input, never panic or over-allocate
    let Ok(reader) = PacketReader::with_version(data.to_vec(), 763) else {
        return;
    };

    let mut r = reader.restart();
    let _ = r.read_var_int();
    let _ = r.read_string();
    let _ = r.read_position();
    let _ = r.read_uuid();
    let _ = r.read_optional(|r| r.read_var_long());
    let _ = r.read_array(|r| r.read_string());

    let mut r = reader.restart();
    let _ = r.read_json();
    let _ = r.read_byte_array();
    let _ = r.read_array(|r| r.read_array(|r| r.read_u16()));
});
