/// ASCII presentation of a rendered BGRA frame
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshview_core::{FrameBuffer, PixelSurface};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Perceived brightness of a `0xAARRGGBB` pixel, 0..=255.
pub fn luminance(pixel: u32) -> u8 {
    let [b, g, r, _] = pixel.to_le_bytes();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    luma.round().clamp(0.0, 255.0) as u8
}

/// Ramp character for a brightness. Anything above zero gets at least the
/// first visible character, so ambient-lit faces do not vanish.
pub fn ramp_char(luma: u8) -> char {
    let steps = LUMINOSITY_RAMP.len() - 1;
    let index = (luma as usize * steps + 254) / 255;
    LUMINOSITY_RAMP[index.min(steps)]
}

fn ramp_color(c: char) -> Color {
    // Color based on character intensity
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        '#' | '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

/// Turns a frame buffer into terminal cells, one pixel per cell.
pub struct AsciiPresenter {
    row: String,
}

impl AsciiPresenter {
    pub fn new() -> Self {
        Self { row: String::new() }
    }

    /// Queue the frame starting at terminal row `top`.
    pub fn draw<W: Write>(&mut self, frame: &FrameBuffer, top: u16, writer: &mut W) -> std::io::Result<()> {
        for y in 0..frame.height() {
            writer.queue(MoveTo(0, top + y as u16))?;

            let mut current: Option<Color> = None;
            self.row.clear();
            for x in 0..frame.width() {
                let c = ramp_char(frame.pixel(x, y).map(luminance).unwrap_or(0));
                let color = ramp_color(c);

                // Flush the run when the color changes
                if current != Some(color) {
                    if !self.row.is_empty() {
                        writer.queue(Print(&self.row))?;
                        self.row.clear();
                    }
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                self.row.push(c);
            }
            if !self.row.is_empty() {
                writer.queue(Print(&self.row))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for AsciiPresenter {
    fn default() -> Self {
        Self::new()
    }
}
