//! Line-based console shared by every page

use std::io::{self, BufRead, BufReader, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Typing this at any prompt cancels the current page.
pub const EXIT: &str = "exit";

const PREFIX: &str = "---> ";

pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    mask_passwords: bool,
}

impl Console {
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>, mask_passwords: bool) -> Self {
        Self {
            input,
            output,
            mask_passwords,
        }
    }

    /// Console on stdin/stdout. Passwords are masked only on a real terminal.
    pub fn stdio() -> Self {
        let mask_passwords = io::stdin().is_terminal();
        Self::new(
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            mask_passwords,
        )
    }

    pub fn print(&mut self, msg: &str) -> io::Result<()> {
        writeln!(self.output, "{}{}", PREFIX, msg)?;
        self.output.flush()
    }

    pub fn print_big(&mut self, title: &str) -> io::Result<()> {
        let bar = "=".repeat(title.chars().count() + 8);
        writeln!(self.output, "\n{}\n    {}\n{}", bar, title, bar)?;
        self.output.flush()
    }

    fn prompt(&mut self, msg: &str) -> io::Result<()> {
        write!(self.output, "{}{}", PREFIX, msg)?;
        self.output.flush()
    }

    /// Next trimmed input line, `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for free text. `None` when the user typed "exit" or input ended.
    pub fn ask_for(&mut self, msg: &str) -> io::Result<Option<String>> {
        self.prompt(msg)?;
        Ok(self.read_line()?.filter(|answer| answer != EXIT))
    }

    /// Ask the user to pick one of `options` by number; returns its zero-based index.
    pub fn ask_option_num<S: AsRef<str>>(&mut self, msg: &str, options: &[S]) -> io::Result<Option<usize>> {
        if options.is_empty() {
            return Ok(None);
        }
        loop {
            self.print(msg)?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.output, "      {}. {}", i + 1, option.as_ref())?;
            }
            let Some(answer) = self.ask_for("Option: ")? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => self.print(&format!(
                    "Please type a number from 1 to {}, or \"{}\".",
                    options.len(),
                    EXIT
                ))?,
            }
        }
    }

    pub fn ask_password(&mut self, msg: &str) -> io::Result<Option<String>> {
        if !self.mask_passwords {
            return self.ask_for(msg);
        }
        self.prompt(msg)?;
        terminal::enable_raw_mode()?;
        let result = self.read_masked();
        terminal::disable_raw_mode()?;
        writeln!(self.output)?;
        Ok(result?.filter(|password| password != EXIT))
    }

    /// Read key presses until Enter, echoing `*`. Esc or Ctrl-C cancels.
    fn read_masked(&mut self) -> io::Result<Option<String>> {
        let mut password = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(Some(password)),
                KeyCode::Esc => return Ok(None),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
                KeyCode::Backspace => {
                    if password.pop().is_some() {
                        write!(self.output, "\x08 \x08")?;
                    }
                }
                KeyCode::Char(c) => {
                    password.push(c);
                    write!(self.output, "*")?;
                }
                _ => {}
            }
            self.output.flush()?;
        }
    }
}
