#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // ASCII and binary PNM
    fs::write(format!("{dir}/pbm_ascii_3x1.pbm"), b"P1\n3 1\n0 1 0\n").unwrap();
    fs::write(format!("{dir}/pgm_ascii_2x1.pgm"), b"P2\n# c\n2 1\n15\n0 15\n").unwrap();
    fs::write(format!("{dir}/ppm_ascii_1x1.ppm"), b"P3 1 1 65535 65535 0 32768").unwrap();
    fs::write(format!("{dir}/pbm_10x2.pbm"), b"P4\n10 2\n\x80\x40\x00\xc0").unwrap();
    fs::write(format!("{dir}/pgm_3x2.pgm"), b"P5\n3 2\n255\n\x00\x40\x80\xc0\xff\x64").unwrap();
    let ppm = b"P6\n2 2\n255\n\xff\x00\x00\x00\xff\x00\x00\x00\xff\x80\x80\x80";
    fs::write(format!("{dir}/ppm_2x2.ppm"), ppm).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // 2x1 1-bit palettized BMP, core header
    let mut core = vec![0u8; 26 + 8 + 4];
    core[0] = b'B'; core[1] = b'M';
    core[2..6].copy_from_slice(&38u32.to_le_bytes());
    core[10..14].copy_from_slice(&34u32.to_le_bytes());
    core[14..18].copy_from_slice(&12u32.to_le_bytes());
    core[18..20].copy_from_slice(&2u16.to_le_bytes());
    core[20..22].copy_from_slice(&1u16.to_le_bytes());
    core[22..24].copy_from_slice(&1u16.to_le_bytes());
    core[24..26].copy_from_slice(&1u16.to_le_bytes());
    core[26..34].copy_from_slice(&[0, 0, 0, 0, 0xff, 0xff, 0xff, 0]); // 2 BGRx entries
    core[34] = 0b0100_0000;
    fs::write(format!("{dir}/bmp_core_1bit.bmp"), &core).unwrap();

    // 1x1 GIF, global table of 2, code size 2: CLR 1 EOI
    let mut gif = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\x09\x08\x07".to_vec();
    gif.extend_from_slice(b"!\xf9\x04\x01\x00\x00\x00\x00");
    gif.extend_from_slice(b",\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x4c\x01\x00;");
    fs::write(format!("{dir}/gif_1x1.gif"), &gif).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_p6.bin"), b"P6").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/gif_no_trailer.bin"), &gif[..gif.len() - 1]).unwrap();

    let lzw = "fuzz/corpus/fuzz_lzw";
    fs::create_dir_all(lzw).unwrap();
    fs::write(format!("{lzw}/lsb_3.bin"), b"\x03\x18\x2a\xa2\x1e\x09").unwrap();
    fs::write(format!("{lzw}/msb_3.bin"), b"\x83\x81\xa2\x2a\xe1\x48").unwrap();
    fs::write(format!("{lzw}/lsb_2_clear.bin"), b"\x02\x4c\x4c\x92\x0b").unwrap();

    println!("Generated seed corpus in {dir}/ and {lzw}/");
}
