//! Path-based opening, format dispatch and one-shot decoding.

use std::fs;

use enough::Unstoppable;
use limg::*;

const PGM: &[u8] = b"P2 2 1 255 10 20";

fn write(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

fn tiny_gif() -> Vec<u8> {
    let mut d = b"GIF89a".to_vec();
    d.extend_from_slice(&[1, 0, 1, 0, 0x80, 0, 0]);
    d.extend_from_slice(&[0, 0, 0, 9, 8, 7]);
    // 1x1 frame, code size 2: CLR, 1, EOI
    d.extend_from_slice(&[b',', 0, 0, 0, 0, 1, 0, 1, 0, 0, 2, 2, 0x4C, 0x01, 0]);
    d.push(b';');
    d
}

fn tiny_bmp() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(b"BM");
    d.extend_from_slice(&58u32.to_le_bytes());
    d.extend_from_slice(&[0; 4]);
    d.extend_from_slice(&54u32.to_le_bytes());
    d.extend_from_slice(&40u32.to_le_bytes());
    d.extend_from_slice(&1i32.to_le_bytes());
    d.extend_from_slice(&1i32.to_le_bytes());
    d.extend_from_slice(&1u16.to_le_bytes());
    d.extend_from_slice(&24u16.to_le_bytes());
    d.extend_from_slice(&[0; 24]);
    // one BGR pixel padded to 4 bytes
    d.extend_from_slice(&[3, 2, 1, 0]);
    d
}

fn render_all(image: &dyn FileImage) -> Vec<u8> {
    let (w, h) = (image.width(), image.height());
    let mut buf = vec![0u8; w as usize * h as usize * 4];
    let mut sink = PixelSink::new(&mut buf, w);
    image
        .render(&mut sink, Viewport::new(w, h), &Unstoppable)
        .unwrap();
    buf
}

#[test]
fn open_dispatches_on_extension() {
    let dir = tempfile::tempdir().unwrap();
    for (name, data, format, first) in [
        ("a.pgm", PGM.to_vec(), ImageFormat::Pnm, [10u8, 10, 10, 255]),
        ("b.gif", tiny_gif(), ImageFormat::Gif, [9, 8, 7, 255]),
        ("c.bmp", tiny_bmp(), ImageFormat::Bmp, [1, 2, 3, 255]),
    ] {
        let image = limg::open(write(&dir, name, &data)).unwrap();
        assert_eq!(image.format(), format, "{name}");
        assert_eq!(&render_all(&image)[..4], &first, "{name}");
    }
}

#[test]
fn extension_match_ignores_case() {
    let dir = tempfile::tempdir().unwrap();
    let image = limg::open(write(&dir, "UPPER.PPM", b"P3 1 1 1 1 0 1")).unwrap();
    assert!(matches!(image, Image::Pnm(_)));
    assert_eq!(render_all(&image), [255, 0, 255, 255]);
}

#[test]
fn extension_wins_over_content() {
    // PNM bytes behind a .bmp name go to the BMP decoder
    let dir = tempfile::tempdir().unwrap();
    let err = limg::open(write(&dir, "lie.bmp", PGM)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn unknown_extension_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["x.png", "noext"] {
        let err = limg::open(write(&dir, name, PGM)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported, "{name}");
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = limg::open(dir.path().join("absent.gif")).unwrap_err();
    assert!(matches!(err, DecodeError::Io(_)), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn per_format_open() {
    let dir = tempfile::tempdir().unwrap();
    let dec = pnm::PnmDecoder::open(write(&dir, "a.pgm", PGM)).unwrap();
    assert_eq!(dec.header().kind, pnm::PnmKind::AsciiGraymap);
    let dec = gif::GifDecoder::open(write(&dir, "b.gif", &tiny_gif())).unwrap();
    assert_eq!(dec.frames().len(), 1);
    let dec = bmp::BmpDecoder::open(write(&dir, "c.bmp", &tiny_bmp())).unwrap();
    assert_eq!(dec.header().bits_per_pixel(), 24);
}

#[test]
fn open_with_options_applies_limits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "a.pgm", PGM);
    let options = DecodeOptions::new().with_limits(Limits {
        max_pixels: Some(1),
        ..Default::default()
    });
    let err = limg::open_with_options(&path, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Limit);
}

#[test]
fn info_probe() {
    let info = ImageInfo::from_bytes(&tiny_gif()).unwrap();
    assert_eq!(
        info,
        ImageInfo {
            width: 1,
            height: 1,
            format: ImageFormat::Gif
        }
    );
    let err = ImageInfo::from_bytes(b"\x89PNG\r\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn request_format_override() {
    let out = DecodeRequest::new(PGM)
        .with_format(ImageFormat::Pnm)
        .decode(Unstoppable)
        .unwrap();
    assert_eq!((out.width, out.height, out.format), (2, 1, ImageFormat::Pnm));

    let err = DecodeRequest::new(PGM)
        .with_format(ImageFormat::Gif)
        .decode(Unstoppable)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn request_memory_limit() {
    let err = DecodeRequest::new(PGM)
        .with_limits(Limits {
            max_memory_bytes: Some(7),
            ..Default::default()
        })
        .decode(Unstoppable)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Limit);
}

#[test]
fn decode_image_from_opened_decoder() {
    let image = Image::from_bytes(&tiny_bmp(), &DecodeOptions::default()).unwrap();
    let out = decode_image(&image, &Limits::default(), &Unstoppable).unwrap();
    assert_eq!(out.pixel(0, 0), Some([1, 2, 3, 255]));
    assert_eq!(ImageInfo::of(&image).format, ImageFormat::Bmp);
    assert_eq!(out.into_pixels().len(), 4);
}

#[cfg(feature = "imgref")]
#[test]
fn typed_views() {
    let out = DecodeRequest::new(PGM).decode(Unstoppable).unwrap();
    let img = out.as_imgref();
    assert_eq!((img.width(), img.height()), (2, 1));
    assert_eq!(img.buf()[1], rgb::RGBA8::new(20, 20, 20, 255));
    assert_eq!(out.to_imgvec().buf().len(), 2);
}
