#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Minimal valid 2x1 16-bit file: 104-byte header, 288-byte image
    // header, a five-byte metadata block (one rotation record, filling
    // the declared size exactly), one frame of 4 bytes.
    let mut dat = Vec::new();
    dat.extend_from_slice(b"UKSOFT2001");
    dat.extend_from_slice(&[0u8; 10]); // id padding
    dat.extend_from_slice(&104i16.to_le_bytes()); // size
    dat.extend_from_slice(&7i16.to_le_bytes()); // version
    dat.extend_from_slice(&16i16.to_le_bytes()); // bitsperpix
    dat.extend_from_slice(&[0u8; 14]); // alignment + spare
    dat.extend_from_slice(&2i16.to_le_bytes()); // width
    dat.extend_from_slice(&1i16.to_le_bytes()); // height
    dat.extend_from_slice(&1i16.to_le_bytes()); // noimg
    dat.extend_from_slice(&0i16.to_le_bytes()); // attachedRecipeSize
    dat.extend_from_slice(&[0u8; 56]); // spare
    dat.extend_from_slice(&288i16.to_le_bytes()); // isize
    dat.extend_from_slice(&10i16.to_le_bytes()); // iversion
    dat.extend_from_slice(&[0u8; 4]); // colorscales
    dat.extend_from_slice(&132_223_104_000_000_000u64.to_le_bytes());
    dat.extend_from_slice(&[0u8; 6]); // mask shifts, usemask, spare
    dat.extend_from_slice(&0i16.to_le_bytes()); // att_markupsize
    dat.extend_from_slice(&0i16.to_le_bytes()); // spin
    dat.extend_from_slice(&5i16.to_le_bytes()); // versleemdata
    dat.extend_from_slice(&[0u8; 260]); // unused fixed region
    dat.push(113); // Rotation record: tag + f32 = 5 bytes
    dat.extend_from_slice(&0.0f32.to_le_bytes());
    dat.extend_from_slice(&[0x34, 0x12, 0x78, 0x56]); // one 2x1 frame
    fs::write(format!("{dir}/minimal_2x1.dat"), &dat).unwrap();

    // A legacy-layout variant (versleemdata = 2, 240-byte inline block)
    let mut legacy = dat[..104 + 26].to_vec();
    legacy.extend_from_slice(&2i16.to_le_bytes()); // versleemdata
    legacy.push(0xFF);
    legacy.extend_from_slice(&[0u8; 239]); // rest of the 240-byte block
    legacy.extend_from_slice(&[0u8; 20]); // spare tail
    legacy.extend_from_slice(&[0x34, 0x12, 0x78, 0x56]);
    fs::write(format!("{dir}/legacy_2x1.dat"), &legacy).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_magic.bin"), b"UKSOFT2001").unwrap();
    fs::write(format!("{dir}/header_only.bin"), &dat[..104]).unwrap();
    fs::write(format!("{dir}/wrong_magic.bin"), b"UKSOFT1999\x00\x00").unwrap();

    println!("Generated seed corpus in {dir}/");
}
