//! Operator input
//!
//! The repair flow decides WHAT to ask; a `Prompter` decides HOW.

#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of operator answers.
pub trait Prompter {
    /// Show `prompt` and return the trimmed answer. An empty string means
    /// "keep the current value".
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Show an informational line.
    fn notice(&mut self, message: &str);
}

/// Reads answers from standard input, blocking without timeout.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        // EOF reads zero bytes and leaves `line` empty
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn notice(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Replays canned answers.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every prompt shown, in order.
    pub asked: Vec<String>,
    pub notices: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            notices: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.asked.push(prompt.to_string());
        // Running out of answers behaves like EOF on stdin
        Ok(self
            .answers
            .pop_front()
            .map(|a| a.trim().to_string())
            .unwrap_or_default())
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        (**self).ask(prompt)
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message)
    }
}
