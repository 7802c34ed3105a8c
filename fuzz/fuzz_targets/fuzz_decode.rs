#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decode at both strictness levels; must never panic
    let _ = uviewdat::decode(data, enough::Unstoppable);
    let _ = uviewdat::DecodeRequest::new(data)
        .with_strictness(uviewdat::Strictness::AllowPadding)
        .decode(enough::Unstoppable);
});
