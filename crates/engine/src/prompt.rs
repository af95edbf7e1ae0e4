//! Operator prompts.
//!
//! Everything that needs an answer from the operator goes through [`Prompt::ask`],
//! which returns the answer as a string: `"yes"`/`"no"` for [`QuestionKind::YesNo`],
//! the digits for [`QuestionKind::Integer`], and the chosen label for
//! [`QuestionKind::Choice`].

use console::style;
use std::io::{self, BufRead, Write};
use thiserror::Error;

pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Error type for prompt operations
#[derive(Debug, Error)]
pub enum PromptError {
    /// Input ended before an answer was given
    #[error("Input closed while waiting for an answer to '{0}'")]
    Closed(String),

    /// IO error reading or writing the terminal
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Shape of the answer a question accepts
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    YesNo,
    /// Unsigned whole number
    Integer,
    /// One of a closed set of labels
    Choice(Vec<String>),
}

/// A question put to the operator
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Stable identifier, used in logs and by scripted prompts
    pub id: &'static str,
    pub message: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn yes_no(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            kind: QuestionKind::YesNo,
        }
    }

    pub fn integer(id: &'static str, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            kind: QuestionKind::Integer,
        }
    }

    pub fn choice(id: &'static str, message: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            id,
            message: message.into(),
            kind: QuestionKind::Choice(choices),
        }
    }
}

/// Something that can answer questions
pub trait Prompt {
    fn ask(&mut self, question: &Question) -> Result<String, PromptError>;
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn ask(&mut self, question: &Question) -> Result<String, PromptError> {
        (**self).ask(question)
    }
}

/// Ask a yes/no question.
pub fn confirm<P: Prompt + ?Sized>(
    prompt: &mut P,
    id: &'static str,
    message: &str,
) -> Result<bool, PromptError> {
    Ok(prompt.ask(&Question::yes_no(id, message))? == YES)
}

/// Ask for an unsigned integer, re-asking until the answer parses.
///
/// `warning` is printed on each rejected answer.
pub fn ask_number<P: Prompt + ?Sized>(
    prompt: &mut P,
    id: &'static str,
    message: &str,
    warning: &str,
) -> Result<u64, PromptError> {
    let question = Question::integer(id, message);
    loop {
        let answer = prompt.ask(&question)?;
        match answer.trim().parse::<u64>() {
            Ok(value) => return Ok(value),
            Err(_) => tracing::warn!(question = id, answer = %answer, "{}", warning),
        }
    }
}

/// Ask the operator to pick one of `choices`.
pub fn choose<P: Prompt + ?Sized>(
    prompt: &mut P,
    id: &'static str,
    message: &str,
    choices: Vec<String>,
) -> Result<String, PromptError> {
    prompt.ask(&Question::choice(id, message, choices))
}

/// Interactive prompt on the controlling terminal.
///
/// Malformed answers are rejected locally and the question is asked again.
pub struct TerminalPrompt<R = io::StdinLock<'static>, W = io::Stdout> {
    input: R,
    output: W,
}

impl TerminalPrompt {
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn render(&mut self, question: &Question) -> io::Result<()> {
        writeln!(self.output)?;
        match &question.kind {
            QuestionKind::YesNo => write!(
                self.output,
                "{} {} {} ",
                style("?").green().bold(),
                style(&question.message).bold(),
                style("[yes/no]").dim()
            )?,
            QuestionKind::Integer => write!(
                self.output,
                "{} {} ",
                style("?").green().bold(),
                style(&question.message).bold()
            )?,
            QuestionKind::Choice(choices) => {
                writeln!(
                    self.output,
                    "{} {}",
                    style("?").green().bold(),
                    style(&question.message).bold()
                )?;
                for (position, choice) in choices.iter().enumerate() {
                    writeln!(self.output, "  {} {}", style(format!("{})", position + 1)).cyan(), choice)?;
                }
                write!(self.output, "{} ", style(">").cyan())?;
            }
        }
        self.output.flush()
    }

    fn read_answer(&mut self, question: &Question) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed(question.id.to_string()));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask(&mut self, question: &Question) -> Result<String, PromptError> {
        loop {
            self.render(question)?;
            let answer = self.read_answer(question)?;
            if let Some(accepted) = validate(&question.kind, &answer) {
                tracing::debug!(question = question.id, answer = %accepted, "operator answered");
                return Ok(accepted);
            }
            writeln!(self.output, "{}", style("Please enter a valid answer.").red())?;
        }
    }
}

/// Normalize `answer` for `kind`, or `None` when it is not acceptable.
fn validate(kind: &QuestionKind, answer: &str) -> Option<String> {
    match kind {
        QuestionKind::YesNo => match answer.to_lowercase().as_str() {
            "y" | "yes" => Some(YES.to_string()),
            "n" | "no" => Some(NO.to_string()),
            _ => None,
        },
        QuestionKind::Integer => {
            if !answer.is_empty() && answer.chars().all(|c| c.is_ascii_digit()) {
                Some(answer.to_string())
            } else {
                None
            }
        }
        QuestionKind::Choice(choices) => {
            if let Some(exact) = choices.iter().find(|choice| choice.as_str() == answer) {
                return Some(exact.clone());
            }
            answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|position| choices.get(position))
                .cloned()
        }
    }
}
