use crate::render::{draw_captions, draw_overlay_popup, write_hud_line, Frame, Renderer};
use anyhow::{Context, anyhow};
use base64::Engine;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KittyTransport {
    File,
    Direct,
}

impl KittyTransport {
    fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Direct => "direct",
        }
    }
}

/// Streams each surface as an RGBA image through the kitty graphics protocol.
/// The image sits below the text layer (`z=-1`), so captions and the HUD are
/// plain text drawn over it.
pub struct KittyRenderer {
    image_id: u32,
    placement_id: u32,

    temp_path: PathBuf,
    temp_payload_b64: String,

    transports: Vec<KittyTransport>,
    active_transport_idx: usize,
    b64_buf: Vec<u8>,
    overlay_visible_last: bool,
    last_hud_rows: u16,
}

impl KittyRenderer {
    pub fn new() -> Self {
        let temp_path = std::env::temp_dir().join(format!("backdrop-fx-{}.rgba", std::process::id()));
        let temp_payload_b64 = base64::engine::general_purpose::STANDARD
            .encode(temp_path.to_string_lossy().as_bytes());

        let mut transports = pick_transport_chain(
            std::env::var("BACKDROP_KITTY_TRANSPORT").ok().as_deref(),
            &std::env::var("TERM_PROGRAM").unwrap_or_default(),
        );
        if transports.is_empty() {
            transports.push(KittyTransport::Direct);
        }

        Self {
            image_id: 1,
            placement_id: 1,
            temp_path,
            temp_payload_b64,
            transports,
            active_transport_idx: 0,
            b64_buf: Vec::new(),
            overlay_visible_last: false,
            last_hud_rows: 0,
        }
    }

    fn write_frame_with_transport(
        &mut self,
        transport: KittyTransport,
        frame: &Frame<'_>,
        out: &mut dyn Write,
        cols: usize,
        visual_rows: usize,
    ) -> anyhow::Result<()> {
        let (w, h) = (frame.pixel_width, frame.pixel_height);
        match transport {
            KittyTransport::Direct => write_kitty_direct_rgba(
                out,
                frame.pixels_rgba,
                (w, h),
                (cols, visual_rows),
                (self.image_id, self.placement_id),
                &mut self.b64_buf,
            ),
            KittyTransport::File => {
                fs::write(&self.temp_path, frame.pixels_rgba)
                    .with_context(|| format!("write kitty temp file {}", self.temp_path.display()))?;

                write!(
                    out,
                    "\x1b_Ga=T,f=32,s={},v={},t=f,i={},p={},c={},r={},C=1,q=2,z=-1;{}\x1b\\",
                    w,
                    h,
                    self.image_id,
                    self.placement_id,
                    cols,
                    visual_rows,
                    self.temp_payload_b64
                )?;
                Ok(())
            }
        }
    }
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w.saturating_mul(h).saturating_mul(4) {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }

        if let Some(text) = frame.overlay {
            write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)?;
            clear_text_rows(out, 1..=frame.term_rows as usize)?;
            let mut hud_lines = frame.hud.lines();
            for i in 0..(frame.hud_rows as usize) {
                write_hud_line(out, visual_rows + i + 1, cols, hud_lines.next())?;
            }
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
            self.overlay_visible_last = true;
            self.last_hud_rows = frame.hud_rows;

            if frame.sync_updates {
                out.write_all(b"\x1b[?2026l")?;
            }
            out.flush()?;
            return Ok(());
        }

        out.write_all(b"\x1b[H")?;

        let start_idx = self
            .active_transport_idx
            .min(self.transports.len().saturating_sub(1));
        let mut rendered = false;
        let mut last_err: Option<anyhow::Error> = None;
        for step in 0..self.transports.len() {
            let idx = (start_idx + step) % self.transports.len();
            let transport = self.transports[idx];
            match self.write_frame_with_transport(transport, frame, out, cols, visual_rows) {
                Ok(()) => {
                    if idx != self.active_transport_idx {
                        log::warn!("kitty transport switched to '{}'", transport.label());
                    }
                    self.active_transport_idx = idx;
                    rendered = true;
                    break;
                }
                Err(err) => {
                    // Terminal IO failing is not something another transport fixes.
                    if err.downcast_ref::<std::io::Error>().is_some() {
                        return Err(err);
                    }
                    last_err = Some(err.context(format!(
                        "kitty transport '{}' failed",
                        transport.label()
                    )));
                }
            }
        }
        if !rendered {
            return Err(last_err.unwrap_or_else(|| anyhow!("no kitty transport succeeded")));
        }

        if frame.hud_rows != self.last_hud_rows || self.overlay_visible_last {
            clear_text_rows(out, 1..=frame.term_rows as usize)?;
        } else {
            // Caption text changes between frames (button label), wipe its rows.
            for cap in frame.captions {
                let row = cap.row(frame.visual_rows) as usize;
                clear_text_rows(out, row..=row)?;
            }
        }

        let mut hud_lines = frame.hud.lines();
        for i in 0..(frame.hud_rows as usize) {
            write_hud_line(out, visual_rows + i + 1, cols, hud_lines.next())?;
        }
        draw_captions(out, frame, true)?;

        self.overlay_visible_last = false;
        self.last_hud_rows = frame.hud_rows;

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl Drop for KittyRenderer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.temp_path);
    }
}

fn pick_transport_chain(forced: Option<&str>, term_program: &str) -> Vec<KittyTransport> {
    if let Some(v) = forced {
        match v.trim().to_ascii_lowercase().as_str() {
            "direct" | "d" => return vec![KittyTransport::Direct],
            "file" | "f" | "temp" | "tempfile" => return vec![KittyTransport::File],
            _ => {}
        }
    }

    // Remote sessions cannot read our temp files.
    let remote = std::env::var_os("SSH_CONNECTION").is_some();
    if remote || term_program.to_ascii_lowercase().contains("ghostty") {
        vec![KittyTransport::Direct, KittyTransport::File]
    } else {
        vec![KittyTransport::File, KittyTransport::Direct]
    }
}

fn write_kitty_direct_rgba(
    out: &mut dyn Write,
    rgba: &[u8],
    (w, h): (usize, usize),
    (cols, rows): (usize, usize),
    (image_id, placement_id): (u32, u32),
    b64_buf: &mut Vec<u8>,
) -> anyhow::Result<()> {
    // 3072 raw bytes -> 4096 base64 bytes, the protocol's chunk limit.
    const RAW_CHUNK: usize = 3 * 1024;

    if rgba.is_empty() {
        return Ok(());
    }

    let mut first = true;
    let mut chunks = rgba.chunks(RAW_CHUNK).peekable();
    while let Some(chunk) = chunks.next() {
        let b64_len = chunk.len().div_ceil(3) * 4;
        if b64_buf.len() < b64_len {
            b64_buf.resize(b64_len, 0);
        }
        let written = base64::engine::general_purpose::STANDARD
            .encode_slice(chunk, &mut b64_buf[..b64_len])
            .context("base64 encode pixels")?;

        let more = chunks.peek().is_some() as u8;
        if first {
            write!(
                out,
                "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p={},c={},r={},C=1,q=2,z=-1,m={};",
                w, h, image_id, placement_id, cols, rows, more
            )?;
            first = false;
        } else {
            write!(out, "\x1b_Gm={};", more)?;
        }
        out.write_all(&b64_buf[..written])?;
        out.write_all(b"\x1b\\")?;
    }

    Ok(())
}

fn clear_text_rows(
    out: &mut dyn Write,
    rows: std::ops::RangeInclusive<usize>,
) -> anyhow::Result<()> {
    for row in rows {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", row)?;
    }
    Ok(())
}
