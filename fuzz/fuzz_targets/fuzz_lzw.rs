#![no_main]
use libfuzzer_sys::fuzz_target;
use limg::BitOrder;
use limg::lzw::LzwDecoder;

fuzz_target!(|data: &[u8]| {
    let Some((&first, stream)) = data.split_first() else {
        return;
    };
    let order = if first & 0x80 != 0 {
        BitOrder::Msb
    } else {
        BitOrder::Lsb
    };
    let Ok(decoder) = LzwDecoder::new(first & 0x0F, order) else {
        return;
    };
    let _ = decoder.with_max_output(1 << 20).decode(stream);
});
