use backdrop_fx::render::{
    cell_color, AsciiRenderer, BrailleRenderer, Caption, CaptionAnchor, CaptionStyle, Frame,
    HalfBlockRenderer, KittyRenderer, Renderer,
};

/// Build a solid-color RGBA pixel buffer.
fn solid_pixels(w: usize, h: usize, r: u8, g: u8, b: u8) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for px in buf.chunks_exact_mut(4) {
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = 255;
    }
    buf
}

/// Build a gradient pixel buffer (varies across x).
fn gradient_pixels(w: usize, h: usize) -> Vec<u8> {
    let mut buf = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) * 4;
            let t = (x as f32 / w.max(1) as f32 * 255.0) as u8;
            buf[i] = t;
            buf[i + 1] = 128;
            buf[i + 2] = 255 - t;
            buf[i + 3] = 255;
        }
    }
    buf
}

fn make_frame<'a>(
    cols: u16,
    visual_rows: u16,
    pw: usize,
    ph: usize,
    pixels: &'a [u8],
    sync: bool,
) -> Frame<'a> {
    Frame {
        term_cols: cols,
        term_rows: visual_rows + 2,
        visual_rows,
        pixel_width: pw,
        pixel_height: ph,
        pixels_rgba: pixels,
        hud: "FPS 60 | Screen: Gradient",
        hud_rows: 1,
        captions: &[],
        overlay: None,
        sync_updates: sync,
    }
}

// ── ASCII renderer ──────────────────────────────────────────────────────────

#[test]
fn ascii_renders_solid_frame() {
    let cols = 10u16;
    let rows = 5u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 200, 200, 200);
    let frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    let mut out = Vec::new();
    let mut renderer = AsciiRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[H"), "missing home cursor");
    assert!(s.contains("\x1b[?7l"), "missing autowrap-off");
    assert!(s.contains("\x1b[?7h"), "missing autowrap-on");
    assert!(s.contains("38;2;200;200;200"), "missing FG color");
    assert!(s.contains("FPS 60"), "HUD text missing");
}

#[test]
fn hud_line_is_clipped_to_terminal_width() {
    let cols = 6u16;
    let rows = 2u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 10, 10, 10);
    let frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[3;1H\x1b[0m\x1b[2KFPS 60"), "HUD row missing");
    assert!(!s.contains("FPS 60 "), "HUD not clipped to {cols} columns");
    assert!(!s.contains("Screen"));
}

#[test]
fn ascii_skips_zero_size() {
    let pixels = solid_pixels(1, 1, 0, 0, 0);
    let frame = make_frame(0, 0, 0, 0, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected empty output for zero-size frame");
}

#[test]
fn short_pixel_buffer_reports_instead_of_panicking() {
    let pixels = solid_pixels(2, 2, 0, 0, 0);
    let frame = make_frame(4, 4, 4, 4, &pixels, false);
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    assert!(String::from_utf8_lossy(&out).contains("pixel buffer too small"));
}

// ── HalfBlock renderer ─────────────────────────────────────────────────────

#[test]
fn halfblock_renders_gradient_frame() {
    let cols = 8u16;
    let rows = 4u16;
    let pw = cols as usize;
    let ph = (rows as usize) * 2;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, true);
    let mut out = Vec::new();
    let mut renderer = HalfBlockRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[?2026h"), "missing sync-begin");
    assert!(s.contains("\x1b[?2026l"), "missing sync-end");
    assert!(s.contains("\u{2580}"), "missing half-block char");
    assert!(s.contains("38;2;"), "missing FG escape");
    assert!(s.contains("48;2;"), "missing BG escape");
}

#[test]
fn halfblock_skips_dimension_mismatch() {
    // pixel_height should be visual_rows*2, but give visual_rows*1
    let pixels = solid_pixels(4, 4, 100, 100, 100);
    let frame = make_frame(4, 4, 4, 4, &pixels, false);
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    assert!(out.is_empty(), "expected empty output for dimension mismatch");
}

#[test]
fn halfblock_resets_color_cache_each_frame() {
    let mut renderer = HalfBlockRenderer::new();

    let red = solid_pixels(4, 4, 255, 0, 0);
    let mut out1 = Vec::new();
    renderer.render(&make_frame(4, 2, 4, 4, &red, false), &mut out1).unwrap();
    assert!(String::from_utf8_lossy(&out1).contains("38;2;255;0;0"));

    let blue = solid_pixels(4, 4, 0, 0, 255);
    let mut out2 = Vec::new();
    renderer.render(&make_frame(4, 2, 4, 4, &blue, false), &mut out2).unwrap();
    assert!(String::from_utf8_lossy(&out2).contains("38;2;0;0;255"));
}

// ── Braille renderer ────────────────────────────────────────────────────────

#[test]
fn braille_renders_gradient_frame() {
    let cols = 6u16;
    let rows = 3u16;
    let pw = (cols as usize) * 2;
    let ph = (rows as usize) * 4;
    let pixels = gradient_pixels(pw, ph);
    let frame = make_frame(cols, rows, pw, ph, &pixels, false);
    let mut out = Vec::new();
    BrailleRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(
        s.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
        "no braille characters found"
    );
    assert!(s.contains("FPS 60"), "HUD text missing");
}

// ── Kitty renderer ──────────────────────────────────────────────────────────

#[test]
fn kitty_streams_image_below_text_layer() {
    let pixels = solid_pixels(8, 8, 10, 20, 30);
    let frame = make_frame(4, 2, 8, 8, &pixels, false);
    let mut out = Vec::new();
    let mut renderer = KittyRenderer::new();
    renderer.render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b_Ga=T,f=32,s=8,v=8,"), "missing image header");
    assert!(s.contains("z=-1"), "image not placed below text");
    assert!(s.contains("FPS 60"), "HUD text missing");
}

// ── Captions and overlay ────────────────────────────────────────────────────

#[test]
fn caption_geometry_is_centered() {
    let cap = Caption {
        text: "Launch star",
        anchor: CaptionAnchor::Bottom,
        style: CaptionStyle::Button { enabled: true },
    };
    assert_eq!(cap.painted(), "[ Launch star ]");
    assert_eq!(cap.row(10), 10);
    assert_eq!(cap.span(40), (13, 27));

    let centered = Caption {
        text: "Tap the screen",
        anchor: CaptionAnchor::Center,
        style: CaptionStyle::Plain,
    };
    assert_eq!(centered.row(10), 6);
    assert_eq!(centered.span(4), (1, 4));
}

#[test]
fn plain_caption_keeps_surface_color_behind_text() {
    let cols = 20u16;
    let rows = 5u16;
    let pixels = solid_pixels(cols as usize, rows as usize * 2, 26, 31, 46);
    let captions = [Caption {
        text: "Tap the screen",
        anchor: CaptionAnchor::Center,
        style: CaptionStyle::Plain,
    }];
    let mut frame = make_frame(cols, rows, cols as usize, rows as usize * 2, &pixels, false);
    frame.captions = &captions;
    let mut out = Vec::new();
    HalfBlockRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("\x1b[3;4H"), "caption not positioned");
    assert!(s.contains("48;2;26;31;46m\x1b") || s.contains("48;2;26;31;46mT"));
    assert!(s.contains('T') && s.contains('n'));
}

#[test]
fn disabled_button_is_dimmed() {
    let pixels = solid_pixels(30, 10, 0, 0, 0);
    let captions = [Caption {
        text: "Star in flight...",
        anchor: CaptionAnchor::Bottom,
        style: CaptionStyle::Button { enabled: false },
    }];
    let mut frame = make_frame(30, 10, 30, 10, &pixels, false);
    frame.captions = &captions;
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("[ Star in flight... ]"));
    assert!(s.contains("48;2;58;56;64"));
}

#[test]
fn cell_color_averages_cell_pixels() {
    // 2x4 cells: left column black, right column white.
    let mut pixels = solid_pixels(2, 4, 0, 0, 0);
    for y in 0..4 {
        let i = (y * 2 + 1) * 4;
        pixels[i..i + 3].copy_from_slice(&[255, 255, 255]);
    }
    let frame = make_frame(1, 1, 2, 4, &pixels, false);
    assert_eq!(cell_color(&frame, 0, 0), (127, 127, 127));
}

#[test]
fn ascii_renders_overlay_popup() {
    let cols = 40u16;
    let rows = 20u16;
    let pixels = solid_pixels(cols as usize, rows as usize, 50, 50, 50);
    let mut frame = make_frame(cols, rows, cols as usize, rows as usize, &pixels, false);
    frame.overlay = Some("Test Overlay\nSecond line");
    let mut out = Vec::new();
    AsciiRenderer::new().render(&frame, &mut out).unwrap();
    let s = String::from_utf8_lossy(&out);
    assert!(s.contains("Test Overlay"), "overlay text missing");
    assert!(s.contains("Second line"), "overlay body missing");
}

#[test]
fn renderer_names() {
    assert_eq!(AsciiRenderer::new().name(), "ascii");
    assert_eq!(HalfBlockRenderer::new().name(), "halfblock");
    assert_eq!(BrailleRenderer::new().name(), "braille");
    assert_eq!(KittyRenderer::new().name(), "kitty");
}
