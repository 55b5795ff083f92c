use super::*;
use crate::assets::fetch::AvatarFetchError;
use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
use crate::text::typeface::{BlockFace, TextRun};

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn background(canvas: Canvas, color: Rgb8) -> DrawOp {
    DrawOp::FillRect {
        rect: Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height)),
        color,
    }
}

fn assert_rgba_close(actual: [u8; 4], expected: [u8; 4]) {
    let close = actual
        .iter()
        .zip(expected)
        .all(|(a, e)| (i16::from(*a) - i16::from(e)).abs() <= 2);
    assert!(close, "expected ~{expected:?}, got {actual:?}");
}

#[test]
fn background_fills_every_pixel() {
    let canvas = Canvas {
        width: 32,
        height: 16,
    };
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![],
        ops: vec![background(canvas, Rgb8::new(0x1a, 0x1a, 0x1a))],
    };
    let face = BlockFace;
    let frame = draw_plan(&plan, &[], face.typesetter().as_mut()).unwrap();

    assert_eq!((frame.width, frame.height), (32, 16));
    assert!(frame.premultiplied);
    assert!(
        frame
            .data
            .chunks_exact(4)
            .all(|px| px == [0x1a, 0x1a, 0x1a, 0xff])
    );
}

#[test]
fn avatar_and_text_land_where_planned() {
    let canvas = Canvas {
        width: 120,
        height: 60,
    };
    let tile = AvatarTile::placeholder(40, Rgb8::new(0x58, 0x65, 0xf2));
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![None],
        ops: vec![
            background(canvas, Rgb8::new(0, 0, 0)),
            DrawOp::Avatar {
                slot: 0,
                origin: Point::new(10.0, 10.0),
            },
            DrawOp::Text(TextRun {
                text: "A".to_string(),
                origin: Point::new(60.0, 10.0),
                size_px: 16.0,
                line_height: 22.0,
                color: Rgb8::new(255, 0, 0),
            }),
        ],
    };
    let face = BlockFace;
    let frame = draw_plan(&plan, &[tile], face.typesetter().as_mut()).unwrap();

    // Avatar center is fully inside the disc; corner is masked out.
    assert_rgba_close(pixel(&frame, 30, 30), [0x58, 0x65, 0xf2, 0xff]);
    assert_eq!(pixel(&frame, 10, 10), [0, 0, 0, 0xff]);
    // Block glyph spans x 60.8..67.2, y 15.4..26.6.
    assert_eq!(pixel(&frame, 64, 20), [255, 0, 0, 0xff]);
    assert_eq!(pixel(&frame, 64, 40), [0, 0, 0, 0xff]);
}

#[test]
fn tall_canvas_renders_in_bands() {
    let canvas = Canvas {
        width: 10,
        height: 70_000,
    };
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![],
        ops: vec![
            background(canvas, Rgb8::new(0x1a, 0x1a, 0x1a)),
            DrawOp::FillRect {
                rect: Rect::new(0.0, 69_990.0, 10.0, 69_995.0),
                color: Rgb8::new(255, 0, 0),
            },
        ],
    };
    let face = BlockFace;
    let frame = draw_plan(&plan, &[], face.typesetter().as_mut()).unwrap();

    assert_eq!((frame.width, frame.height), (10, 70_000));
    assert_eq!(frame.data.len(), 10 * 70_000 * 4);
    assert_eq!(pixel(&frame, 0, 0), [0x1a, 0x1a, 0x1a, 0xff]);
    assert_eq!(pixel(&frame, 5, 65_535), [0x1a, 0x1a, 0x1a, 0xff]);
    assert_eq!(pixel(&frame, 5, 69_992), [255, 0, 0, 0xff]);
    assert_eq!(pixel(&frame, 9, 69_999), [0x1a, 0x1a, 0x1a, 0xff]);
}

#[test]
fn band_seams_do_not_change_pixels() {
    let canvas = Canvas {
        width: 120,
        height: 60,
    };
    let tile = AvatarTile::placeholder(40, Rgb8::new(0x58, 0x65, 0xf2));
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![None],
        ops: vec![
            background(canvas, Rgb8::new(0, 0, 0)),
            DrawOp::Avatar {
                slot: 0,
                origin: Point::new(10.0, 10.0),
            },
            DrawOp::Text(TextRun {
                text: "AB".to_string(),
                origin: Point::new(60.0, 10.0),
                size_px: 16.0,
                line_height: 22.0,
                color: Rgb8::new(255, 0, 0),
            }),
        ],
    };
    let face = BlockFace;
    let tiles = [tile];
    let whole = draw_plan_in_bands(&plan, &tiles, face.typesetter().as_mut(), 60).unwrap();
    let banded = draw_plan_in_bands(&plan, &tiles, face.typesetter().as_mut(), 7).unwrap();

    assert_eq!(banded.height, whole.height);
    assert_eq!(banded.data.len(), whole.data.len());
    for y in 0..canvas.height {
        for x in 0..canvas.width {
            assert_rgba_close(pixel(&banded, x, y), pixel(&whole, x, y));
        }
    }
}

#[test]
fn canvas_wider_than_a_surface_is_a_render_error() {
    let canvas = Canvas {
        width: 70_000,
        height: 10,
    };
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![],
        ops: vec![],
    };
    let face = BlockFace;
    let err = draw_plan(&plan, &[], face.typesetter().as_mut()).unwrap_err();
    assert!(matches!(err, ChatsnapError::Render(_)));
    assert!(err.to_string().contains("width exceeds u16"));
}

#[test]
fn missing_avatar_slot_is_a_render_error() {
    let canvas = Canvas {
        width: 50,
        height: 50,
    };
    let plan = DrawPlan {
        canvas,
        avatar_urls: vec![None],
        ops: vec![DrawOp::Avatar {
            slot: 0,
            origin: Point::ZERO,
        }],
    };
    let face = BlockFace;
    let err = draw_plan(&plan, &[], face.typesetter().as_mut()).unwrap_err();
    assert!(err.to_string().contains("avatar slot 0"));
}

struct Unreachable;

impl AvatarFetcher for Unreachable {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, AvatarFetchError> {
        Err(AvatarFetchError::Timeout)
    }
}

fn message(username: &str, body: &str) -> Message {
    Message {
        username: username.to_string(),
        body: body.to_string(),
        color: "#ffffff".to_string(),
        rgb: Rgb8::new(255, 255, 255),
        timestamp: String::new(),
        avatar_url: Some("https://unreachable.test/a.png".to_string()),
    }
}

#[test]
fn backend_frame_uses_placeholder_for_failed_avatar() {
    let cfg = RenderConfig::default();
    let backend = CpuBackend::new(Arc::new(BlockFace), Arc::new(Unreachable));
    let frame = backend
        .render_frame(&[message("A", "Hello world")], &cfg)
        .unwrap();

    assert_eq!((frame.width, frame.height), (800, 86));
    assert_eq!(pixel(&frame, 0, 0), [0x1a, 0x1a, 0x1a, 0xff]);
    // Avatar tile spans 20..60 on both axes.
    assert_rgba_close(pixel(&frame, 40, 40), [0x58, 0x65, 0xf2, 0xff]);
}

#[test]
fn backend_render_returns_png() {
    let cfg = RenderConfig::default();
    let backend = CpuBackend::new(Arc::new(BlockFace), Arc::new(Unreachable));
    let png = backend.render(&[message("A", "hi")], &cfg).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}
