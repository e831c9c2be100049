#![no_main]
use libfuzzer_sys::fuzz_target;
use swfx::coder::{decode, encode};
use swfx::{ActionObject, Context};

fuzz_target!(|data: &[u8]| {
    let ctx = Context::new();
    if let Ok(action) = decode::<ActionObject>(data, &ctx) {
        assert_eq!(encode(&action, &ctx).expect("re-encode"), data);
    }
});
