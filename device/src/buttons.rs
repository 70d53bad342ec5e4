// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{
    io::BufRead,
    sync::mpsc::{self, Receiver},
    thread,
};

use log::{debug, error};

/// Physical button input
pub trait Buttons {
    /// Poll for a decision (`true` for accept), returning `None` if no button was pressed
    fn poll(&mut self) -> Option<bool>;
}

impl<T: Buttons> Buttons for &mut T {
    fn poll(&mut self) -> Option<bool> {
        T::poll(self)
    }
}

impl Buttons for Receiver<bool> {
    fn poll(&mut self) -> Option<bool> {
        self.try_recv().ok()
    }
}

/// Parse a terminal line to a button decision (`y` / `n`)
pub fn parse_button(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Buttons emulated via stdin
///
/// A reader thread forwards `y` / `n` lines as decisions, any other
/// non-empty line is passed through to the receiver returned from
/// [StdinButtons::spawn] (for host PIN entry on a shared terminal).
pub struct StdinButtons {
    rx: Receiver<bool>,
}

impl StdinButtons {
    /// Spawn the stdin reader thread
    pub fn spawn() -> (Self, Receiver<String>) {
        let (btn_tx, btn_rx) = mpsc::channel();
        let (line_tx, line_rx) = mpsc::channel();

        thread::spawn(move || {
            let stdin = std::io::stdin();

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(v) => v,
                    Err(e) => {
                        error!("stdin read failed: {}", e);
                        break;
                    }
                };

                let sent = match parse_button(&line) {
                    Some(b) => btn_tx.send(b).is_ok(),
                    None if line.trim().is_empty() => true,
                    None => line_tx.send(line.trim().to_string()).is_ok(),
                };

                if !sent {
                    debug!("stdin receiver closed");
                    break;
                }
            }
        });

        (Self { rx: btn_rx }, line_rx)
    }
}

impl Buttons for StdinButtons {
    fn poll(&mut self) -> Option<bool> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_buttons() {
        assert_eq!(parse_button("y"), Some(true));
        assert_eq!(parse_button(" YES\n"), Some(true));
        assert_eq!(parse_button("n"), Some(false));
        assert_eq!(parse_button("1234"), None);
        assert_eq!(parse_button(""), None);
    }

    #[test]
    fn channel_buttons() {
        let (tx, mut rx) = mpsc::channel();
        assert_eq!(rx.poll(), None);

        tx.send(false).unwrap();
        assert_eq!(rx.poll(), Some(false));
    }
}
