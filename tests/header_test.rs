use aseprite_codec::{Document, Error, Header, HeaderFlags, PixelFormat};
use parsing::{ReadBytes, WriteBytes};
use pretty_assertions::assert_eq;

fn empty_sprite(format: PixelFormat) -> Vec<u8> {
    Document::new(Header::new(64, 32, format), Vec::new())
        .unwrap()
        .write()
        .unwrap()
}

#[test]
fn header_layout() {
    let mut header = Header::new(64, 32, PixelFormat::Indexed);
    header.file_size = 128;
    header.flags = HeaderFlags::LAYER_OPACITY_VALID | HeaderFlags::GROUP_OPACITY_VALID;
    header.transparent_index = 7;
    header.grid_x = -8;

    let mut out = Vec::new();
    out.write_type_le(&header).unwrap();
    assert_eq!(out.len(), Header::LEN);
    assert_eq!(&out[0..4], &[128, 0, 0, 0]);
    assert_eq!(&out[4..6], &[0xE0, 0xA5]);
    assert_eq!(&out[8..12], &[64, 0, 32, 0]);
    assert_eq!(&out[12..14], &[8, 0]);
    assert_eq!(&out[14..18], &[3, 0, 0, 0]);
    assert_eq!(&out[18..20], &[100, 0]);
    // reserved dwords
    assert_eq!(&out[20..28], &[0; 8]);
    assert_eq!(out[28], 7);
    assert_eq!(&out[36..38], &[0xF8, 0xFF]);

    let mut b = out.as_slice();
    assert_eq!(b.read_type_le::<Header>().unwrap(), header);
}

#[test]
fn empty_sprite_round_trip() {
    let bytes = empty_sprite(PixelFormat::Grayscale);
    assert_eq!(bytes.len(), 128);

    let document = aseprite_codec::read(&bytes).unwrap();
    assert_eq!(document.pixel_format(), PixelFormat::Grayscale);
    assert_eq!(document.header.width, 64);
    assert!(document.frames.is_empty());
}

#[test]
fn bad_magic_is_a_format_error() {
    let mut bytes = empty_sprite(PixelFormat::Rgba);
    bytes[4] = 0xE1;
    let err = aseprite_codec::read(&bytes).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err:?}");
}

#[test]
fn unknown_color_depth_is_a_format_error() {
    let mut bytes = empty_sprite(PixelFormat::Rgba);
    bytes[12] = 24;
    let err = aseprite_codec::read(&bytes).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err:?}");
}

#[test]
fn truncated_header_is_a_bounds_error() {
    let bytes = empty_sprite(PixelFormat::Rgba);
    for len in [0, 3, 40, 127] {
        let err = aseprite_codec::read(&bytes[..len]).unwrap_err();
        assert!(matches!(err, Error::Bounds { .. }), "{len}: {err:?}");
    }
}

#[test]
fn file_size_beyond_buffer_is_a_bounds_error() {
    let mut bytes = empty_sprite(PixelFormat::Rgba);
    bytes[0] = 200;
    let err = aseprite_codec::read(&bytes).unwrap_err();
    assert!(matches!(
        err,
        Error::Bounds {
            needed: 200,
            remaining: 128
        }
    ));
}

#[test]
fn file_size_below_header_is_a_format_error() {
    let mut bytes = empty_sprite(PixelFormat::Rgba);
    bytes[0] = 64;
    let err = aseprite_codec::read(&bytes).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{err:?}");
}
