//! Interactive questions asked while building setting targets.
//!
//! Tasks ask through the [`Prompt`] trait so that `--yes` runs and tests
//! never touch the terminal.
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use crate::error::ReconcileError;

/// Source of answers to interactive questions.
pub trait Prompt: Send + Sync {
    /// Ask a free-text question; an empty answer selects `default`.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UserAborted`] when input ends or no answer
    /// (and no default) is available.
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String, ReconcileError>;

    /// Ask the user to pick one of `options`; returns the chosen index.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UserAborted`] when input ends.
    fn choose(&self, question: &str, options: &[&str], default: usize)
    -> Result<usize, ReconcileError>;
}

fn aborted(question: &str) -> ReconcileError {
    ReconcileError::UserAborted {
        question: question.to_string(),
    }
}

/// Line-oriented prompt over any reader/writer pair.
#[derive(Debug)]
pub struct ConsolePrompt<R, W> {
    io: Mutex<(R, W)>,
}

impl ConsolePrompt<io::BufReader<io::Stdin>, io::Stdout> {
    /// A prompt reading from stdin and writing to stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    /// Create a prompt over `input` and `output`.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    /// Print `prompt` and read one trimmed line; `None` on end of input.
    fn read_answer(&self, prompt: &str) -> io::Result<Option<String>> {
        let mut guard = self
            .io
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (input, output) = &mut *guard;
        write!(output, "{prompt}")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn write_line(&self, text: &str) -> io::Result<()> {
        let mut guard = self
            .io
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(guard.1, "{text}")
    }
}

impl<R: BufRead + Send, W: Write + Send> Prompt for ConsolePrompt<R, W> {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String, ReconcileError> {
        let prompt = default.map_or_else(
            || format!("{question}: "),
            |d| format!("{question} [{d}]: "),
        );
        loop {
            match self.read_answer(&prompt) {
                Ok(Some(answer)) if !answer.is_empty() => return Ok(answer),
                Ok(Some(_)) => {
                    if let Some(d) = default {
                        return Ok(d.to_string());
                    }
                }
                Ok(None) | Err(_) => return Err(aborted(question)),
            }
        }
    }

    fn choose(
        &self,
        question: &str,
        options: &[&str],
        default: usize,
    ) -> Result<usize, ReconcileError> {
        let mut menu = format!("\n{question}:");
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("\n  \x1b[1m{}\x1b[0m) {option}", i + 1));
        }
        self.write_line(&menu).map_err(|_| aborted(question))?;

        let prompt = format!("Choice [1-{}] ({}): ", options.len(), default + 1);
        loop {
            let answer = match self.read_answer(&prompt) {
                Ok(Some(answer)) => answer,
                Ok(None) | Err(_) => return Err(aborted(question)),
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => {
                    self.write_line("invalid selection")
                        .map_err(|_| aborted(question))?;
                }
            }
        }
    }
}

/// Prompt used with `--yes`: always takes the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractivePrompt;

impl Prompt for NonInteractivePrompt {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String, ReconcileError> {
        default.map(str::to_string).ok_or_else(|| aborted(question))
    }

    fn choose(&self, _: &str, _: &[&str], default: usize) -> Result<usize, ReconcileError> {
        Ok(default)
    }
}

/// Canned answers for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: Mutex<std::collections::VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompt {
    /// Answer questions in order with `answers`; later questions abort.
    #[must_use]
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| (*a).to_string()).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Every question asked so far.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    fn next(&self, question: &str) -> Result<String, ReconcileError> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .ok_or_else(|| aborted(question))
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String, ReconcileError> {
        let answer = self.next(question)?;
        match (answer.is_empty(), default) {
            (true, Some(d)) => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn choose(&self, question: &str, _: &[&str], default: usize) -> Result<usize, ReconcileError> {
        let answer = self.next(question)?;
        Ok(answer.parse::<usize>().map_or(default, |n| n.saturating_sub(1)))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> ConsolePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        ConsolePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(prompt: ConsolePrompt<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let (_, out) = prompt.io.into_inner().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn ask_returns_trimmed_answer() {
        let prompt = console("  Ada Lovelace \n");
        assert_eq!(prompt.ask("Git user name", None).unwrap(), "Ada Lovelace");
        assert_eq!(output(prompt), "Git user name: ");
    }

    #[test]
    fn ask_empty_answer_uses_default() {
        let prompt = console("\n");
        assert_eq!(
            prompt.ask("Key comment", Some("ada@host")).unwrap(),
            "ada@host"
        );
    }

    #[test]
    fn ask_repeats_until_answer_without_default() {
        let prompt = console("\n\nada@example.com\n");
        assert_eq!(
            prompt.ask("Git user email", None).unwrap(),
            "ada@example.com"
        );
        assert_eq!(output(prompt).matches("Git user email: ").count(), 3);
    }

    #[test]
    fn ask_end_of_input_aborts() {
        let prompt = console("");
        let err = prompt.ask("Git user name", None).unwrap_err();
        assert_eq!(err.to_string(), "user aborted: Git user name");
    }

    #[test]
    fn choose_maps_one_based_answer() {
        let prompt = console("3\n");
        assert_eq!(
            prompt
                .choose("SSH key type", &["ed25519", "ecdsa", "rsa"], 0)
                .unwrap(),
            2
        );
    }

    #[test]
    fn choose_empty_answer_uses_default() {
        let prompt = console("\n");
        assert_eq!(prompt.choose("SSH key type", &["ed25519", "rsa"], 1).unwrap(), 1);
    }

    #[test]
    fn choose_rejects_out_of_range_then_accepts() {
        let prompt = console("9\n1\n");
        assert_eq!(prompt.choose("SSH key type", &["ed25519", "rsa"], 1).unwrap(), 0);
        assert!(output(prompt).contains("invalid selection"));
    }

    #[test]
    fn non_interactive_takes_defaults() {
        let prompt = NonInteractivePrompt;
        assert_eq!(prompt.ask("Comment", Some("x")).unwrap(), "x");
        assert_eq!(prompt.choose("Type", &["a", "b"], 1).unwrap(), 1);
        assert!(prompt.ask("Git user name", None).is_err());
    }

    #[test]
    fn scripted_prompt_records_questions() {
        let prompt = ScriptedPrompt::new(&["Ada"]);
        assert_eq!(prompt.ask("Git user name", None).unwrap(), "Ada");
        assert!(prompt.ask("Git user email", None).is_err());
        assert_eq!(prompt.asked(), vec!["Git user name", "Git user email"]);
    }
}
