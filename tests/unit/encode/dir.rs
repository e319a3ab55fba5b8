use super::*;
use crate::foundation::core::TargetSize;
use crate::pan::sequencer::generate_pan;

fn solid(w: u32, h: u32, rgb: [u8; 3]) -> Raster {
    Raster::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

#[test]
fn jpeg_still_lands_under_identifier_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirSink::new(dir.path(), StillFormat::Jpeg);
    let id = ArtifactId::preview("beach", "square", 3);
    sink.write_still(&id, &solid(48, 32, [200, 40, 40])).unwrap();

    let path = dir.path().join("beach/square/crop3/preview.jpg");
    assert_eq!(sink.still_path(&id), path);
    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (48, 32));
    assert_eq!(sink.written(), 1);
}

#[test]
fn png_still_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirSink::new(dir.path(), StillFormat::Png);
    let id = ArtifactId::fit("s", "leaderboard");
    let raster = solid(16, 8, [1, 2, 3]);
    sink.write_still(&id, &raster).unwrap();

    let decoded = image::open(dir.path().join("s/leaderboard/fit.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(decoded, raster);
}

#[test]
fn sequence_is_a_multi_frame_gif() {
    use image::AnimationDecoder as _;

    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirSink::new(dir.path(), StillFormat::Jpeg);
    let master = Raster::from_fn(64, 64, |x, _| image::Rgba([(x * 4) as u8, 0, 0, 255]));
    let frames: Vec<_> = generate_pan(&master, &TargetSize::new("t", 16, 32), 4)
        .unwrap()
        .collect();
    let id = ArtifactId::pan("s", "t");
    sink.write_sequence(&id, &frames, 300).unwrap();

    let f = std::fs::File::open(dir.path().join("s/t/pan.gif")).unwrap();
    let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(f)).unwrap();
    let decoded = decoder.into_frames().collect_frames().unwrap();
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded[0].buffer().dimensions(), (16, 32));
}

#[test]
fn empty_sequence_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirSink::new(dir.path(), StillFormat::Jpeg);
    let err = sink
        .write_sequence(&ArtifactId::pan("s", "t"), &[], 300)
        .unwrap_err();
    assert!(matches!(err, AdsmithError::Validation(_)));
}
