//! Interactive prompts for settings not given on the command line.

use std::io::{self, BufRead, Write};

/// Source of answers for missing settings.
pub trait Ask {
    /// Ask one question. `None` means no answer is available (non-interactive
    /// session or end of input).
    fn ask(&mut self, question: &str) -> io::Result<Option<String>>;

    /// Show a message to whoever is answering.
    fn tell(&mut self, _message: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Never answers. Used with `--no-prompt` or when stdin is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl Ask for NoPrompt {
    fn ask(&mut self, _question: &str) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Line-oriented prompter over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Ask for Prompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(clean_answer(&line)))
    }

    fn tell(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }
}

/// Trim whitespace and one pair of surrounding quotes, which users often keep
/// when pasting paths.
fn clean_answer(line: &str) -> String {
    let trimmed = line.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}
