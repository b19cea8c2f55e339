use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use glam::Vec2;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a key counts as held after its last press or repeat when the
/// terminal cannot report releases
const HOLD_WINDOW: Duration = Duration::from_millis(120);

/// Pointer pixels per terminal cell, used to turn cell motion into look deltas
const LOOK_PX_PER_COL: f32 = 4.0;
const LOOK_PX_PER_ROW: f32 = 8.0;

/// Input gathered for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// x: forward, y: left; each in -1..=1
    pub move_axis: Vec2,
    /// x: turn right, y: look up; each in -1..=1
    pub look_axis: Vec2,
    /// Pointer motion in pixels, positive y looks up
    pub look_delta: Vec2,
    pub scroll: f32,
    pub lmb: bool,
    pub space: bool,
    pub temp_up_held: bool,
    pub temp_down_held: bool,
    pub temp_up_presses: u32,
    pub temp_down_presses: u32,
    pub toggle_depth: bool,
    pub toggle_cull: bool,
    pub toggle_textures: bool,
    pub toggle_transparency: bool,
    pub toggle_debug: bool,
    pub resized: Option<(u16, u16)>,
    pub quit: bool,
}

/// Turns the terminal event stream into per-frame level and edge input.
pub struct InputCollector {
    /// Terminal reports key releases
    exact_release: bool,
    held: HashMap<KeyCode, Instant>,
    lmb_down: bool,
    last_pointer: Option<(u16, u16)>,
    pending: FrameInput,
}

impl InputCollector {
    pub fn new(exact_release: bool) -> Self {
        InputCollector {
            exact_release,
            held: HashMap::new(),
            lmb_down: false,
            last_pointer: None,
            pending: FrameInput::default(),
        }
    }

    pub fn handle(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.pending.resized = Some((*cols, *rows)),
            Event::FocusLost => {
                self.held.clear();
                self.lmb_down = false;
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        let code = normalize(key.code);

        if key.kind == KeyEventKind::Release {
            self.held.remove(&code);
            return;
        }
        self.held.insert(code, now);

        if key.kind != KeyEventKind::Press {
            return;
        }
        let p = &mut self.pending;
        match code {
            KeyCode::Esc | KeyCode::Char('q') => p.quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => p.quit = true,
            KeyCode::Char('w') => p.temp_up_presses += 1,
            KeyCode::Char('s') => p.temp_down_presses += 1,
            KeyCode::Char('d') => p.toggle_depth ^= true,
            KeyCode::Char('c') => p.toggle_cull ^= true,
            KeyCode::Char('t') => p.toggle_textures ^= true,
            KeyCode::Char('x') => p.toggle_transparency ^= true,
            KeyCode::F(1) => p.toggle_debug ^= true,
            // Tapped faster than a frame still has to register
            KeyCode::Char(' ') => p.space = true,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.lmb_down = true;
                self.pending.lmb = true;
            }
            MouseEventKind::Up(MouseButton::Left) => self.lmb_down = false,
            MouseEventKind::ScrollUp => self.pending.scroll += 1.0,
            MouseEventKind::ScrollDown => self.pending.scroll -= 1.0,
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                let here = (mouse.column, mouse.row);
                if let Some((col, row)) = self.last_pointer {
                    self.pending.look_delta += Vec2::new(
                        (here.0 as f32 - col as f32) * LOOK_PX_PER_COL,
                        (row as f32 - here.1 as f32) * LOOK_PX_PER_ROW,
                    );
                }
                self.last_pointer = Some(here);
            }
            _ => {}
        }
    }

    fn is_held(&self, code: KeyCode, now: Instant) -> bool {
        match self.held.get(&code) {
            Some(_) if self.exact_release => true,
            Some(&seen) => now.saturating_duration_since(seen) <= HOLD_WINDOW,
            None => false,
        }
    }

    /// Drains everything collected since the previous call.
    pub fn frame(&mut self, now: Instant) -> FrameInput {
        if !self.exact_release {
            self.held
                .retain(|_, seen| now.saturating_duration_since(*seen) <= HOLD_WINDOW);
        }

        let axis = |pos: KeyCode, neg: KeyCode| {
            let mut v = 0.0;
            if self.is_held(pos, now) {
                v += 1.0;
            }
            if self.is_held(neg, now) {
                v -= 1.0;
            }
            v
        };
        let move_axis = Vec2::new(
            axis(KeyCode::Up, KeyCode::Down),
            axis(KeyCode::Left, KeyCode::Right),
        );
        let look_axis = Vec2::new(
            axis(KeyCode::Char('l'), KeyCode::Char('j')),
            axis(KeyCode::Char('i'), KeyCode::Char('k')),
        );
        let temp_up_held = self.is_held(KeyCode::Char('w'), now);
        let temp_down_held = self.is_held(KeyCode::Char('s'), now);
        let space_held = self.is_held(KeyCode::Char(' '), now);

        let mut input = std::mem::take(&mut self.pending);
        input.move_axis = move_axis;
        input.look_axis = look_axis;
        input.temp_up_held = temp_up_held;
        input.temp_down_held = temp_down_held;
        // Without releases a held key would swallow the next tap
        if self.exact_release {
            input.space |= space_held;
        }
        input.lmb |= self.lmb_down;
        input
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn emulated_hold_expires() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&key(KeyCode::Up, KeyEventKind::Press), t0);

        assert_eq!(input.frame(t0 + Duration::from_millis(50)).move_axis.x, 1.0);
        assert_eq!(input.frame(t0 + Duration::from_millis(500)).move_axis.x, 0.0);
    }

    #[test]
    fn exact_release_holds_until_released() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(true);
        input.handle(&key(KeyCode::Left, KeyEventKind::Press), t0);

        let later = t0 + Duration::from_secs(5);
        assert_eq!(input.frame(later).move_axis.y, 1.0);
        input.handle(&key(KeyCode::Left, KeyEventKind::Release), later);
        assert_eq!(input.frame(later).move_axis.y, 0.0);
    }

    #[test]
    fn presses_are_counted_once() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(true);
        input.handle(&key(KeyCode::Char('W'), KeyEventKind::Press), t0);
        input.handle(&key(KeyCode::Char('w'), KeyEventKind::Repeat), t0);
        input.handle(&key(KeyCode::Char('w'), KeyEventKind::Press), t0);

        let frame = input.frame(t0);
        assert_eq!(frame.temp_up_presses, 2);
        assert!(frame.temp_up_held);
        assert_eq!(input.frame(t0).temp_up_presses, 0);
    }

    #[test]
    fn quick_click_still_registers() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 1, 1), t0);
        input.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 1, 1), t0);

        assert!(input.frame(t0).lmb);
        assert!(!input.frame(t0).lmb);
    }

    #[test]
    fn pointer_motion_becomes_look_delta() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&mouse(MouseEventKind::Moved, 10, 10), t0);
        input.handle(&mouse(MouseEventKind::Moved, 12, 9), t0);

        let frame = input.frame(t0);
        assert_eq!(frame.look_delta, Vec2::new(2.0 * LOOK_PX_PER_COL, LOOK_PX_PER_ROW));
    }

    #[test]
    fn toggles_and_quit() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&key(KeyCode::Char('d'), KeyEventKind::Press), t0);
        input.handle(&key(KeyCode::F(1), KeyEventKind::Press), t0);
        input.handle(&key(KeyCode::Esc, KeyEventKind::Press), t0);

        let frame = input.frame(t0);
        assert!(frame.toggle_depth && frame.toggle_debug && frame.quit);
        assert!(!frame.toggle_cull);
    }

    #[test]
    fn quick_space_taps_each_register() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&key(KeyCode::Char(' '), KeyEventKind::Press), t0);
        assert!(input.frame(t0).space);

        let t1 = t0 + Duration::from_millis(20);
        assert!(!input.frame(t1).space);

        let t2 = t0 + Duration::from_millis(60);
        input.handle(&key(KeyCode::Char(' '), KeyEventKind::Press), t2);
        assert!(input.frame(t2).space);
    }

    #[test]
    fn scroll_accumulates() {
        let t0 = Instant::now();
        let mut input = InputCollector::new(false);
        input.handle(&mouse(MouseEventKind::ScrollUp, 0, 0), t0);
        input.handle(&mouse(MouseEventKind::ScrollUp, 0, 0), t0);
        input.handle(&mouse(MouseEventKind::ScrollDown, 0, 0), t0);
        assert_eq!(input.frame(t0).scroll, 1.0);
    }
}
