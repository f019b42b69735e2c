use super::*;

fn frame(width: u32, height: u32, data: Vec<u8>) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data,
        premultiplied: true,
    }
}

#[test]
fn from_frame_rejects_size_mismatch() {
    let err = Texture::from_frame(frame(2, 2, vec![0; 15])).unwrap_err();
    assert!(matches!(err, LottieError::TextureDecodeFailed(_)));
    let tex = Texture::from_frame(frame(2, 2, vec![0; 16])).unwrap();
    assert_eq!((tex.width, tex.height), (2, 2));
}

#[test]
fn unpremultiplies_for_export() {
    let tex = Texture::from_frame(frame(2, 1, vec![64, 0, 0, 128, 9, 9, 9, 0])).unwrap();
    assert_eq!(tex.to_straight_rgba8(), vec![128, 0, 0, 128, 0, 0, 0, 0]);
    assert_eq!(tex.pixel(0, 0), Some([128, 0, 0, 128]));
    assert_eq!(tex.pixel(2, 0), None);
}

#[test]
fn straight_textures_are_returned_as_is() {
    let tex = Texture {
        width: 1,
        height: 1,
        data: vec![10, 20, 30, 40],
        premultiplied: false,
    };
    assert_eq!(tex.to_straight_rgba8(), vec![10, 20, 30, 40]);
}

#[test]
fn replacing_texture_bumps_generation() {
    let node = DisplayNode::new();
    let other = node.clone();
    assert!(node.texture().is_none());
    let tex = Arc::new(Texture::from_frame(frame(1, 1, vec![1, 2, 3, 255])).unwrap());
    node.replace_texture(tex.clone());
    node.replace_texture(tex);
    assert_eq!(other.generation(), 2);
    assert!(other.ptr_eq(&node));
    assert_eq!(other.texture().map(|t| t.data.clone()), Some(vec![1, 2, 3, 255]));
}

#[test]
fn resizing_keeps_scale() {
    let node = DisplayNode::new();
    node.set_scale(2.0);
    node.set_display_size(320, 240);
    assert_eq!(node.display_size(), Some((320, 240)));
    assert_eq!(node.scale(), 2.0);
}
