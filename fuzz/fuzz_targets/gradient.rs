#![no_main]
use libfuzzer_sys::fuzz_target;
use swfx::coder::{decode, encode};
use swfx::{Context, GradientFill};

// Füllbits hinter der Matrix gehen verloren, daher nur Wert-Gleichheit nach
// einem zweiten Durchlauf.
fuzz_target!(|data: &[u8]| {
    let Some((&flags, data)) = data.split_first() else { return };
    let ctx = if flags & 1 != 0 { Context::new().with_transparency() } else { Context::new() };
    if let Ok(fill) = decode::<GradientFill>(data, &ctx) {
        let bytes = encode(&fill, &ctx).expect("re-encode");
        assert_eq!(decode::<GradientFill>(&bytes, &ctx).expect("decode again"), fill);
    }
});
