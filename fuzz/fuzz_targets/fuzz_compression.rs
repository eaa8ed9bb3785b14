#![no_main]

use craft_protocol::utils::compression::{compress, decompress, decompress_with_limit};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(compressed) = compress(data) {
        let restored = decompress(&compressed);
        assert!(data.len() > 2 * 1024 * 1024 || restored.as_deref().ok() == Some(data));
    }

    // Raw input goes straight at the decoder with a tight ceiling
    let _ = decompress(data);
    let _ = decompress_with_limit(data, 1024);
});
