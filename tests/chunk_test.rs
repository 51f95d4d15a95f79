use aseprite_codec::chunk::{chunk_type, UnknownChunk};
use aseprite_codec::{
    CelChunk, CelContent, Chunk, ChunkData, ColorProfileChunk, Compression, Error, LayerChunk,
    PixelFormat, Pixels, ReadOptions, UnknownChunkPolicy,
};
use pretty_assertions::assert_eq;
use rgb::alt::GrayAlpha;

fn encode(data: ChunkData, format: PixelFormat) -> Vec<u8> {
    let mut out = Vec::new();
    Chunk::new(0, data).unwrap().encode(&mut out, format).unwrap();
    out
}

fn decode(bytes: &[u8], format: PixelFormat, options: &ReadOptions) -> Option<Chunk> {
    let mut b = bytes;
    let chunk = Chunk::decode(&mut b, 0, format, options).unwrap();
    assert!(b.is_empty());
    chunk
}

#[test]
fn layer_chunk_layout() {
    let bytes = encode(ChunkData::Layer(LayerChunk::new("ab")), PixelFormat::Rgba);
    assert_eq!(
        bytes,
        [
            26, 0, 0, 0, 0x04, 0x20, // header
            3, 0, // visible | editable
            0, 0, // normal layer
            0, 0, 0, 0, 0, 0, // child level, default size
            0, 0, // blend mode
            255, 0, 0, 0, // opacity, reserved
            2, 0, b'a', b'b',
        ]
    );
}

#[test]
fn raw_cel_chunk_is_sized_by_its_pixels() {
    let cel = CelChunk::new(
        0,
        CelContent::Raw {
            width: 2,
            height: 1,
            pixels: Pixels::Grayscale(vec![GrayAlpha::new(1, 255), GrayAlpha::new(2, 128)]),
        },
    );
    let bytes = encode(ChunkData::Cel(cel.clone()), PixelFormat::Grayscale);
    assert_eq!(bytes.len(), 6 + 16 + 4 + 4);
    assert_eq!(&bytes[0..6], &[30, 0, 0, 0, 0x05, 0x20]);
    assert_eq!(&bytes[26..], &[1, 255, 2, 128]);

    let chunk = decode(&bytes, PixelFormat::Grayscale, &ReadOptions::default()).unwrap();
    assert_eq!(chunk.data, ChunkData::Cel(cel));
}

#[test]
fn compressed_cel_stream_fills_the_chunk() {
    let pixels = Pixels::Indexed(vec![7; 64]);
    let content = CelContent::compressed(8, 8, &pixels, Compression::fast()).unwrap();
    let bytes = encode(ChunkData::Cel(CelChunk::new(0, content)), PixelFormat::Indexed);

    let chunk = decode(&bytes, PixelFormat::Indexed, &ReadOptions::default()).unwrap();
    let ChunkData::Cel(cel) = &chunk.data else {
        panic!("expected a cel, got {:?}", chunk.data);
    };
    let CelContent::Compressed { data, .. } = &cel.content else {
        panic!("expected a compressed cel");
    };
    assert_eq!(chunk.size as usize, bytes.len());
    assert_eq!(data.len(), bytes.len() - 26);
    assert_eq!(cel.content.decompressed_pixels(PixelFormat::Indexed).unwrap(), Some(pixels));
}

#[test]
fn embedded_profile_requires_icc_data() {
    let mut profile = ColorProfileChunk::embedded(vec![1, 2, 3]);
    let bytes = encode(ChunkData::ColorProfile(profile.clone()), PixelFormat::Rgba);
    // header, type, flags, gamma, reserved, length, data
    assert_eq!(bytes.len(), 6 + 2 + 2 + 4 + 8 + 4 + 3);
    assert_eq!(&bytes[22..26], &[3, 0, 0, 0]);

    profile.icc = None;
    let mut out = Vec::new();
    let err = Chunk::new(0, ChunkData::ColorProfile(profile))
        .unwrap()
        .encode(&mut out, PixelFormat::Rgba)
        .unwrap_err();
    assert!(matches!(err, Error::Format(_)));
}

#[test]
fn unknown_type_follows_policy() {
    let bytes = [9_u8, 0, 0, 0, 0x99, 0x20, 1, 2, 3];

    let chunk = decode(&bytes, PixelFormat::Rgba, &ReadOptions::default()).unwrap();
    let unknown = ChunkData::Unknown(UnknownChunk {
        chunk_type: 0x2099,
        data: vec![1, 2, 3],
    });
    assert_eq!(chunk.data, unknown);
    assert_eq!(encode(unknown, PixelFormat::Rgba), bytes);

    let skip = ReadOptions::default().with_unknown_chunks(UnknownChunkPolicy::Skip);
    assert_eq!(decode(&bytes, PixelFormat::Rgba, &skip), None);

    let reject = ReadOptions::default().with_unknown_chunks(UnknownChunkPolicy::Reject);
    let mut b = bytes.as_slice();
    assert!(matches!(
        Chunk::decode(&mut b, 0, PixelFormat::Rgba, &reject),
        Err(Error::UnsupportedChunk { chunk_type: 0x2099 })
    ));
}

#[test]
fn known_types_are_never_unknown() {
    for code in [
        chunk_type::OLD_PALETTE,
        chunk_type::OLD_PALETTE_64,
        chunk_type::PATH,
        chunk_type::USER_DATA,
    ] {
        let mut bytes = vec![10, 0, 0, 0];
        bytes.extend(code.to_le_bytes());
        bytes.extend([0, 0, 0, 0]);
        let reject = ReadOptions::default().with_unknown_chunks(UnknownChunkPolicy::Reject);
        let chunk = decode(&bytes, PixelFormat::Rgba, &reject).unwrap();
        assert_eq!(chunk.data.chunk_type(), code);
    }
}

fn chunk_bytes(code: u16, body: &[u8]) -> Vec<u8> {
    let mut bytes = ((body.len() + 6) as u32).to_le_bytes().to_vec();
    bytes.extend(code.to_le_bytes());
    bytes.extend(body);
    bytes
}

#[test]
fn out_of_range_enum_codes_are_format_errors() {
    let mut tag = vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    tag.extend([0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let mut reverse_ping_pong = tag.clone();
    reverse_ping_pong[14] = 3;

    let mut cel = vec![0_u8; 16];
    cel[6] = 255;
    cel[7] = 3;

    let mut layer = vec![0_u8; 18];
    layer[2] = 2;

    let mut profile = vec![0_u8; 16];
    profile[0] = 3;

    let cases = [
        ("loop direction", chunk_type::TAGS, tag),
        ("loop direction", chunk_type::TAGS, reverse_ping_pong),
        ("cel type", chunk_type::CEL, cel),
        ("layer type", chunk_type::LAYER, layer),
        ("color profile type", chunk_type::COLOR_PROFILE, profile),
    ];
    for (what, code, body) in cases {
        let bytes = chunk_bytes(code, &body);
        let mut b = bytes.as_slice();
        let err = Chunk::decode(&mut b, 0, PixelFormat::Rgba, &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Format(_)), "{what}: {err:?}");
    }
}
