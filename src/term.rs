use crate::{Coords, TermInt};
use std::io::{stdout, Stdout, Write};
use std::time::Instant;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

/// Cursor-addressed terminal drawing with an in-memory copy of the
/// screen, so overlays can be hidden by restoring what they covered.
pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    backing: Vec<char>,
    overlay: Option<Overlay>,
}

/// Bounding box of the overlay currently drawn on top of the screen.
struct Overlay {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Self {
        let (width, height) = terminal::size().expect("Error reading terminal size.");

        TermManager {
            width,
            height,
            stdout: stdout(),
            backing: vec![' '; width as usize * height as usize],
            overlay: None,
        }
    }

    pub fn setup(&mut self) {
        execute!(self.stdout, EnterAlternateScreen).expect("Error entering alt screen");
        terminal::enable_raw_mode().expect("Error enabling raw mode.");
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
            .expect("Error hiding cursor.");
    }

    pub fn restore(&mut self) {
        terminal::disable_raw_mode().expect("Error disabling raw mode.");
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking)
            .expect("Error restoring cursor.");
        execute!(self.stdout, LeaveAlternateScreen).expect("Error leaving alt screen");
    }

    pub fn size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Adopts a new terminal size after an Event::Resize; whatever was
    /// on screen is discarded and must be redrawn by the caller.
    pub fn resize(&mut self, width: TermInt, height: TermInt) {
        self.width = width;
        self.height = height;
        self.backing = vec![' '; width as usize * height as usize];
        self.overlay = None;
        self.clear();
    }

    /// Blocks until a key is pressed and returns it. Other events are
    /// swallowed; this is only used on static screens.
    pub fn read_key_blocking(&self) -> KeyEvent {
        loop {
            if let Event::Key(ev) = read().unwrap() {
                return ev;
            }
        }
    }

    /// Drains input (key and resize events) until `deadline`, so the
    /// caller's next tick starts on time no matter how much or little
    /// arrives in between.
    pub fn read_events_until(&self, deadline: Instant) -> Vec<Event> {
        let mut events = vec![];

        loop {
            let now = Instant::now();
            if now >= deadline {
                return events;
            }

            if poll(deadline - now).unwrap() {
                events.push(read().unwrap());
            }
        }
    }

    pub fn draw_borders(&mut self, top_left: Coords, size: Coords) {
        let (width, height) = size;
        let end_x = top_left.0 + width - 1;
        let end_y = top_left.1 + height - 1;

        for x in top_left.0..=end_x {
            let ch = if x == top_left.0 || x == end_x { '+' } else { '-' };
            self.print_at((x, top_left.1), ch);
            self.print_at((x, end_y), ch);
        }

        for y in top_left.1 + 1..end_y {
            self.print_at((top_left.0, y), '|');
            self.print_at((end_x, y), '|');
        }

        self.flush();
    }

    /// Draws a centered boxed message on top of the screen. Hiding it
    /// puts back whatever it covered.
    pub fn show_overlay(&mut self, lines: &[&str]) {
        if self.overlay.is_some() {
            self.hide_overlay();
        }

        let box_height = (lines.len() + 2) as TermInt;
        let longest = lines.iter().map(|l| l.len()).max().unwrap() as TermInt;
        let box_width = longest + 2;
        let top_left = (
            (self.width / 2).saturating_sub(box_width / 2),
            (self.height / 2).saturating_sub(box_height / 2),
        );

        // Blank the top and bottom padding rows
        for &y in &[top_left.1, top_left.1 + box_height - 1] {
            for dx in 0..box_width {
                self.print_transient((top_left.0 + dx, y), ' ');
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{: ^width$}", line, width = box_width as usize);
            let y = top_left.1 + i as TermInt + 1;

            for (dx, ch) in padded.char_indices() {
                self.print_transient((top_left.0 + dx as TermInt, y), ch);
            }
        }

        self.overlay = Some(Overlay { top_left, width: box_width, height: box_height });
        self.flush();
    }

    pub fn hide_overlay(&mut self) {
        let overlay = match self.overlay.take() {
            Some(o) => o,
            None => return,
        };

        // Repaint the covered region from the backing buffer
        for dy in 0..overlay.height {
            for dx in 0..overlay.width {
                let pos = (overlay.top_left.0 + dx, overlay.top_left.1 + dy);
                if pos.0 < self.width && pos.1 < self.height {
                    let ch = self.backing[self.width as usize * pos.1 as usize + pos.0 as usize];
                    self.print_transient(pos, ch);
                }
            }
        }

        self.flush();
    }

    /// Prints a character and remembers it in the backing buffer.
    /// Positions outside the current terminal are dropped, which can
    /// happen transiently while a resize is being processed.
    pub fn print_at(&mut self, pos: Coords, ch: char) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).unwrap();
        self.backing[self.width as usize * pos.1 as usize + pos.0 as usize] = ch;
    }

    pub fn clear(&mut self) {
        execute!(self.stdout, terminal::Clear(ClearType::All)).expect("Error clearing.");
        self.backing = vec![' '; self.width as usize * self.height as usize];
    }

    pub fn flush(&mut self) {
        self.stdout.flush().expect("Error flushing.");
    }

    // Prints without touching the backing buffer; used for overlays so
    // hide_overlay() can restore the board underneath.
    fn print_transient(&mut self, pos: Coords, ch: char) {
        if pos.0 >= self.width || pos.1 >= self.height {
            return;
        }

        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch)).unwrap();
    }
}
