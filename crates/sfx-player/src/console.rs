use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use std::io::{BufRead, Write};
use tracing::warn;

/// Line-oriented terminal the control loop talks to.
pub trait Console {
    /// Next input line without its line ending, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
    fn write_line(&mut self, line: &str);
    fn clear(&mut self) {}
}

pub struct StdConsole {
    stdin: std::io::Stdin,
    stdout: std::io::Stdout,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            stdin: std::io::stdin(),
            stdout: std::io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!("console: failed to read stdin: {}", e);
                None
            }
        }
    }

    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.stdout, "{}", line);
        let _ = self.stdout.flush();
    }

    fn clear(&mut self) {
        let _ = crossterm::execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0));
    }
}
