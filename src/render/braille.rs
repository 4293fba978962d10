use crate::render::{luma_u8, text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb, Frame, Renderer};
use std::io::Write;

/// 2x4 dot cells. Each cell splits its pixels at the mid luma into "on" and
/// "off" dots and paints the two groups' mean colors as fg/bg.
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Accum {
    r: u32,
    g: u32,
    b: u32,
    n: u32,
}

impl Accum {
    fn add(&mut self, (r, g, b): (u8, u8, u8)) {
        self.r += r as u32;
        self.g += g as u32;
        self.b += b as u32;
        self.n += 1;
    }

    fn mean(&self) -> Option<(u8, u8, u8)> {
        (self.n > 0).then(|| {
            (
                (self.r / self.n) as u8,
                (self.g / self.n) as u8,
                (self.b / self.n) as u8,
            )
        })
    }
}

// Dot order is row-major over the 2x4 cell.
const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

fn cell_glyph(rgb: &[(u8, u8, u8); 8]) -> ((u8, u8, u8), (u8, u8, u8), char) {
    let lum = rgb.map(|(r, g, b)| luma_u8(r, g, b));
    let min_l = lum.iter().copied().min().unwrap_or(0) as u16;
    let max_l = lum.iter().copied().max().unwrap_or(0) as u16;
    let thr = (min_l + max_l) / 2;

    let mut bits = 0u8;
    let mut on = Accum::default();
    let mut off = Accum::default();
    for i in 0..8 {
        if lum[i] as u16 > thr {
            bits |= DOT_BITS[i];
            on.add(rgb[i]);
        } else {
            off.add(rgb[i]);
        }
    }

    let bg = off.mean().unwrap_or((0, 0, 0));
    if bits == 0 {
        return (bg, bg, ' ');
    }
    let fg = on.mean().unwrap_or(bg);
    let bg = off.mean().unwrap_or(fg);
    let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
    (fg, bg, ch)
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 2, 4, out)? else {
            return Ok(());
        };

        self.last_fg = None;
        self.last_bg = None;
        let px = frame.pixels_rgba;

        for row in 0..visual_rows {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;
                let mut rgb = [(0u8, 0u8, 0u8); 8];
                for dy in 0..4usize {
                    for dx in 0..2usize {
                        let idx = ((base_y + dy) * w + base_x + dx) * 4;
                        rgb[dy * 2 + dx] = (px[idx], px[idx + 1], px[idx + 2]);
                    }
                }

                let (fg, bg, ch) = cell_glyph(&rgb);
                if self.last_fg != Some(fg) {
                    write_fg_rgb(out, fg.0, fg.1, fg.2)?;
                    self.last_fg = Some(fg);
                }
                if self.last_bg != Some(bg) {
                    write_bg_rgb(out, bg.0, bg.1, bg.2)?;
                    self.last_bg = Some(bg);
                }
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}
