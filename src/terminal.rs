use crate::graphics::FrameBuffer;
use crossterm::{
    cursor,
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';
const HUD_BG: [u8; 3] = [18, 22, 26];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: [u8; 3],
    bg: [u8; 3],
}

impl Cell {
    fn blank() -> Self {
        Cell {
            ch: ' ',
            fg: [0; 3],
            bg: [0; 3],
        }
    }
}

/// Double-buffered cell grid. Only cells that changed since the last flush
/// are written out.
pub struct Screen {
    cols: u16,
    rows: u16,
    back: Vec<Cell>,
    front: Vec<Cell>,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        let n = cols as usize * rows as usize;
        Screen {
            cols,
            rows,
            back: vec![Cell::blank(); n],
            front: vec![Cell::blank(); n],
        }
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Pixel size of a framebuffer that fills the grid
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.cols as usize, self.rows as usize * 2)
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let n = cols as usize * rows as usize;
        self.back.resize(n, Cell::blank());
        self.front.resize(n, Cell::blank());
        self.back.fill(Cell::blank());
        self.front.fill(Cell::blank());
    }

    /// Packs two framebuffer rows into each cell row
    pub fn compose(&mut self, fb: &FrameBuffer) {
        let cols = self.cols as usize;
        for y in 0..self.rows as usize {
            for x in 0..cols {
                let (top, bottom) = (y * 2, y * 2 + 1);
                let fg = if x < fb.width && top < fb.height {
                    fb.pixel(x, top)
                } else {
                    [0; 3]
                };
                let bg = if x < fb.width && bottom < fb.height {
                    fb.pixel(x, bottom)
                } else {
                    fg
                };
                self.back[y * cols + x] = Cell {
                    ch: HALF_BLOCK,
                    fg,
                    bg,
                };
            }
        }
    }

    /// Writes a line of text on a dark strip, clipped at the right edge
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, fg: [u8; 3]) {
        if y >= self.rows {
            return;
        }
        let row = y as usize * self.cols as usize;
        for (i, ch) in text.chars().enumerate() {
            let cx = x as usize + i;
            if cx >= self.cols as usize {
                break;
            }
            self.back[row + cx] = Cell { ch, fg, bg: HUD_BG };
        }
    }

    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        let mut last_fg: Option<[u8; 3]> = None;
        let mut last_bg: Option<[u8; 3]> = None;

        let cols = self.cols as usize;
        for y in 0..self.rows as usize {
            let mut x = 0usize;
            while x < cols {
                let i = y * cols + x;
                if self.back[i] == self.front[i] {
                    x += 1;
                    continue;
                }
                // find run
                let mut x2 = x + 1;
                while x2 < cols && self.back[y * cols + x2] != self.front[y * cols + x2] {
                    x2 += 1;
                }

                queue!(out, cursor::MoveTo(x as u16, y as u16))?;
                for c in &self.back[i..y * cols + x2] {
                    if last_bg != Some(c.bg) {
                        queue!(out, SetBackgroundColor(rgb(c.bg)))?;
                        last_bg = Some(c.bg);
                    }
                    if last_fg != Some(c.fg) {
                        queue!(out, SetForegroundColor(rgb(c.fg)))?;
                        last_fg = Some(c.fg);
                    }
                    queue!(out, Print(c.ch))?;
                }

                // commit to front
                self.front[i..y * cols + x2].copy_from_slice(&self.back[i..y * cols + x2]);
                x = x2;
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// Enters the alternate screen and raw mode
pub fn enter_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap)?;
    terminal::enable_raw_mode()
}

/// Turns on mouse reporting and, when available, key release reporting.
/// Returns whether releases will be reported.
pub fn enable_input<W: Write>(out: &mut W) -> io::Result<bool> {
    execute!(out, EnableMouseCapture, EnableFocusChange)?;
    let exact_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if exact_release {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(exact_release)
}

/// Restores the terminal. Every step runs even if an earlier one failed.
pub fn cleanup<W: Write>(out: &mut W, exact_release: bool) -> io::Result<()> {
    let raw = terminal::disable_raw_mode();
    if exact_release {
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    let screen = execute!(
        out,
        DisableFocusChange,
        DisableMouseCapture,
        EndSynchronizedUpdate,
        ResetColor,
        EnableLineWrap,
        cursor::Show,
        LeaveAlternateScreen
    );
    raw.and(screen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn block_count(bytes: &[u8]) -> usize {
        String::from_utf8_lossy(bytes).matches(HALF_BLOCK).count()
    }

    #[test]
    fn first_flush_writes_every_cell() {
        let mut fb = FrameBuffer::new(4, 6);
        fb.clear(Vec3::new(0.5, 0.5, 0.5));
        let mut screen = Screen::new(4, 3);
        screen.compose(&fb);

        let mut out = Vec::new();
        screen.flush(&mut out).unwrap();
        assert_eq!(block_count(&out), 12);
    }

    #[test]
    fn only_changed_cells_are_written() {
        let mut fb = FrameBuffer::new(4, 6);
        fb.clear(Vec3::ZERO);
        let mut screen = Screen::new(4, 3);
        screen.compose(&fb);
        screen.flush(&mut Vec::new()).unwrap();

        let mut out = Vec::new();
        screen.compose(&fb);
        screen.flush(&mut out).unwrap();
        assert_eq!(block_count(&out), 0);

        // Bottom pixel of cell (2, 1)
        fb.pixels[3 * 4 + 2] = [255, 0, 0];
        screen.compose(&fb);
        let mut out = Vec::new();
        screen.flush(&mut out).unwrap();
        assert_eq!(block_count(&out), 1);
    }

    #[test]
    fn cells_pack_two_pixel_rows() {
        let mut fb = FrameBuffer::new(1, 2);
        fb.pixels[0] = [1, 2, 3];
        fb.pixels[1] = [4, 5, 6];
        let mut screen = Screen::new(1, 1);
        screen.compose(&fb);
        assert_eq!(screen.back[0].fg, [1, 2, 3]);
        assert_eq!(screen.back[0].bg, [4, 5, 6]);
    }

    #[test]
    fn text_is_clipped_to_grid() {
        let mut screen = Screen::new(5, 2);
        screen.draw_text(3, 1, "hello", [255; 3]);
        screen.draw_text(0, 9, "offscreen", [255; 3]);
        assert_eq!(screen.back[5 + 3].ch, 'h');
        assert_eq!(screen.back[5 + 4].ch, 'e');
        assert_eq!(screen.back[5 + 2], Cell::blank());
    }

    #[test]
    fn resize_reports_pixel_size() {
        let mut screen = Screen::new(10, 4);
        screen.resize(20, 8);
        assert_eq!((screen.cols, screen.rows()), (20, 8));
        assert_eq!(screen.pixel_size(), (20, 16));
    }
}
