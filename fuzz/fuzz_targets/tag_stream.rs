#![no_main]
use libfuzzer_sys::fuzz_target;
use swfx::Context;
use swfx::tag::{decode_tags, encode_tags};

// Alles, was sich decodieren lässt, muss byte-genau wieder herauskommen.
fuzz_target!(|data: &[u8]| {
    let ctx = Context::new();
    if let Ok(tags) = decode_tags(data, &ctx) {
        let bytes = encode_tags(&tags, &ctx).expect("re-encode of decoded tags");
        assert_eq!(bytes, data);
    }
});
