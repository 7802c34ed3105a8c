#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Probing must never panic, and anything that fully decodes must probe
    let probed = uviewdat::DatInfo::from_bytes(data);
    if let Ok(image) = uviewdat::decode(data, enough::Unstoppable) {
        let info = probed.expect("decodable file failed the header probe");
        assert_eq!(info.width, image.width());
        assert_eq!(info.height, image.height());
        assert_eq!(usize::from(info.frame_count), image.frame_count());
    }
});
