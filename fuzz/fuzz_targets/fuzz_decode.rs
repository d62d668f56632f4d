#![no_main]
use libfuzzer_sys::fuzz_target;
use limg::{ByteSource, DecodeOptions, DecodeRequest, FileImage, Image, ImageFormat, Limits};
use limg::{PixelSink, Viewport};

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        max_memory_bytes: Some(1 << 26),
        ..Default::default()
    };

    // Sniffed decode must never panic
    let _ = DecodeRequest::new(data)
        .with_limits(limits.clone())
        .decode(enough::Unstoppable);

    // Each decoder on every input, rendering through a small viewport
    let options = DecodeOptions::new().with_limits(limits);
    for format in [ImageFormat::Bmp, ImageFormat::Gif, ImageFormat::Pnm] {
        let Ok(image) = Image::from_source(format, ByteSource::from(data), &options) else {
            continue;
        };
        let viewport = Viewport::new(image.width().min(32), image.height().min(32));
        let mut buf = vec![0u8; 32 * 32 * 4];
        let mut sink = PixelSink::new(&mut buf, 32);
        let _ = image.render(&mut sink, viewport, &enough::Unstoppable);
    }
});
