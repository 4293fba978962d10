mod ascii;
mod braille;
mod halfblock;
mod kitty;

pub use ascii::AsciiRenderer;
pub use braille::BrailleRenderer;
pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionAnchor {
    /// Vertically centered in the surface.
    Center,
    /// Last surface row.
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStyle {
    Plain,
    Button { enabled: bool },
}

/// Text drawn over the surface, horizontally centered.
#[derive(Debug, Clone, Copy)]
pub struct Caption<'a> {
    pub text: &'a str,
    pub anchor: CaptionAnchor,
    pub style: CaptionStyle,
}

impl Caption<'_> {
    /// 1-based terminal row the caption lands on.
    pub fn row(&self, visual_rows: u16) -> u16 {
        match self.anchor {
            CaptionAnchor::Center => visual_rows / 2 + 1,
            CaptionAnchor::Bottom => visual_rows.max(1),
        }
    }

    /// Text as painted, buttons padded with brackets.
    pub fn painted(&self) -> String {
        match self.style {
            CaptionStyle::Plain => self.text.to_string(),
            CaptionStyle::Button { .. } => format!("[ {} ]", self.text),
        }
    }

    /// 1-based column span `(start, end_inclusive)` for a surface `cols` wide.
    pub fn span(&self, cols: u16) -> (u16, u16) {
        let len = self.painted().chars().count().min(cols as usize) as u16;
        let start = cols.saturating_sub(len) / 2 + 1;
        (start, start + len.saturating_sub(1))
    }
}

pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub captions: &'a [Caption<'a>],
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

#[inline]
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    // Approx Rec.709 luma using integer math.
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u8
}

pub(crate) fn write_fg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> std::io::Result<()> {
    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)
}

pub(crate) fn write_bg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> std::io::Result<()> {
    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)
}

/// Validates geometry and starts a text-cell frame. Returns `None` when there is
/// nothing to paint; geometry mismatches are skipped silently.
pub(crate) fn text_frame_begin(
    frame: &Frame<'_>,
    px_per_col: usize,
    px_per_row: usize,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize, usize, usize)>> {
    let cols = frame.term_cols as usize;
    let visual_rows = frame.visual_rows as usize;
    let w = frame.pixel_width;
    let h = frame.pixel_height;

    if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
        return Ok(None);
    }
    if w != cols.saturating_mul(px_per_col) || h != visual_rows.saturating_mul(px_per_row) {
        return Ok(None);
    }

    let need = w.saturating_mul(h).saturating_mul(4);
    if frame.pixels_rgba.len() < need {
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        out.write_all(b"\x1b[H\x1b[0m\x1b[2J")?;
        write!(
            out,
            "pixel buffer too small (need {}, got {})",
            need,
            frame.pixels_rgba.len()
        )?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        return Ok(None);
    }

    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    out.write_all(b"\x1b[H\x1b[0m")?;
    // Autowrap off while painting full-width rows; writing the last column
    // would otherwise wrap and the following CRLF leaves a blank line.
    out.write_all(b"\x1b[?7l")?;
    Ok(Some((cols, visual_rows, w, h)))
}

/// HUD, captions, popup, then restore autowrap and close the synchronized update.
pub(crate) fn text_frame_end(
    frame: &Frame<'_>,
    cols: usize,
    visual_rows: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut hud_lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write_hud_line(out, visual_rows + i + 1, cols, hud_lines.next())?;
    }

    draw_captions(out, frame, false)?;

    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

pub(crate) fn write_hud_line(
    out: &mut dyn Write,
    row: usize,
    cols: usize,
    line: Option<&str>,
) -> anyhow::Result<()> {
    write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", row)?;
    if let Some(line) = line {
        let clipped: String = line.chars().take(cols).collect();
        write!(out, "{clipped}")?;
    }
    Ok(())
}

/// Mean color of the surface pixels under a terminal cell (0-based).
pub fn cell_color(frame: &Frame<'_>, col: usize, row: usize) -> (u8, u8, u8) {
    let cols = frame.term_cols as usize;
    let rows = frame.visual_rows as usize;
    let w = frame.pixel_width;
    let h = frame.pixel_height;
    if cols == 0 || rows == 0 || w == 0 || h == 0 {
        return (0, 0, 0);
    }
    if frame.pixels_rgba.len() < w * h * 4 {
        return (0, 0, 0);
    }
    let px_w = (w / cols).max(1);
    let px_h = (h / rows).max(1);
    let x0 = (col * px_w).min(w - 1);
    let y0 = (row * px_h).min(h - 1);
    let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
    for y in y0..(y0 + px_h).min(h) {
        for x in x0..(x0 + px_w).min(w) {
            let i = (y * w + x) * 4;
            r += frame.pixels_rgba[i] as u32;
            g += frame.pixels_rgba[i + 1] as u32;
            b += frame.pixels_rgba[i + 2] as u32;
            n += 1;
        }
    }
    let n = n.max(1);
    ((r / n) as u8, (g / n) as u8, (b / n) as u8)
}

/// Paint captions over the surface. Plain captions keep the color of the cell
/// underneath (or the terminal default when `transparent`, so graphics placed
/// beneath the text layer stay visible).
pub fn draw_captions(out: &mut dyn Write, frame: &Frame<'_>, transparent: bool) -> anyhow::Result<()> {
    if frame.term_cols == 0 || frame.visual_rows == 0 {
        return Ok(());
    }
    for cap in frame.captions {
        let text = cap.painted();
        if text.trim().is_empty() {
            continue;
        }
        let row = cap.row(frame.visual_rows);
        let (start, _) = cap.span(frame.term_cols);
        write!(out, "\x1b[0m\x1b[{};{}H", row, start)?;

        match cap.style {
            CaptionStyle::Plain => {
                out.write_all(b"\x1b[1m")?;
                write_fg_rgb(out, 255, 255, 255)?;
                for (i, ch) in text.chars().take(frame.term_cols as usize).enumerate() {
                    if transparent {
                        out.write_all(b"\x1b[49m")?;
                    } else {
                        let (r, g, b) = cell_color(
                            frame,
                            (start as usize - 1) + i,
                            row as usize - 1,
                        );
                        write_bg_rgb(out, r, g, b)?;
                    }
                    write!(out, "{ch}")?;
                }
            }
            CaptionStyle::Button { enabled } => {
                if enabled {
                    write_bg_rgb(out, 103, 80, 164)?;
                    write_fg_rgb(out, 255, 255, 255)?;
                } else {
                    write_bg_rgb(out, 58, 56, 64)?;
                    write_fg_rgb(out, 150, 148, 156)?;
                }
                let clipped: String = text.chars().take(frame.term_cols as usize).collect();
                write!(out, "{clipped}")?;
            }
        }
        out.write_all(b"\x1b[0m")?;
    }
    Ok(())
}

pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner_w = cols.saturating_sub(6).max(1);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let chars: Vec<char> = raw.chars().collect();
        for chunk in chars.chunks(max_inner_w) {
            lines.push(chunk.iter().collect());
        }
    }
    if lines.is_empty() {
        return Ok(());
    }

    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner_w);
    let box_w = (inner_w + 4).min(cols.saturating_sub(2)).max(4);
    let inner_w = box_w.saturating_sub(4);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);

    let start_col = (cols.saturating_sub(box_w)) / 2 + 1;
    let start_row = (rows.saturating_sub(box_h)) / 2 + 1;

    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(inner_w);

    out.write_all(b"\x1b[0m\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m")?;
    write!(out, "\x1b[{};{}H+{}+", start_row, start_col, horiz)?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{};{}H| {} |", row, start_col, blank)?;
        if i == 0 {
            write!(
                out,
                "\x1b[{};{}H\x1b[1m\x1b[38;2;255;236;160m{}\x1b[22m\x1b[38;2;236;242;255m",
                row,
                start_col + 2,
                line
            )?;
        } else {
            write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
        }
    }
    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
