//! Interactive remediation session.
//!
//! Operator-driven state machine over line-buffered console IO. Every
//! transition is gated on one line of input; there is no timeout and
//! no concurrency. EOF anywhere ends the session.

use crate::command::CommandRunner;
use crate::remediation::{ActionOutcome, Catalog};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Top-level operator decision after the suggestions are shown.
///
/// A closed enumeration: anything unrecognized is `Other` and treated
/// as a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopChoice {
    Auto,
    Manual,
    Select,
    Other,
}

impl TopChoice {
    fn parse(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "auto" => Self::Auto,
            "manual" => Self::Manual,
            "select" => Self::Select,
            _ => Self::Other,
        }
    }
}

/// Session states. `Done` is terminal; no input is read after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingTopChoice,
    SelectingIssue,
    AwaitingContinue,
    Done,
}

/// One interactive run, from suggestion display to `Done`.
pub struct RemediationSession<'a, R, W> {
    input: R,
    output: W,
    runner: &'a dyn CommandRunner,
    catalog: &'a Catalog,
    state: SessionState,
    attempted: Vec<&'static str>,
}

impl<'a, R: BufRead, W: Write> RemediationSession<'a, R, W> {
    pub fn new(input: R, output: W, runner: &'a dyn CommandRunner, catalog: &'a Catalog) -> Self {
        Self {
            input,
            output,
            runner,
            catalog,
            state: SessionState::Idle,
            attempted: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Keys of the catalog actions attempted this session, in order.
    pub fn attempted(&self) -> &[&'static str] {
        &self.attempted
    }

    /// Drive the machine from `Idle` to `Done`.
    pub fn run(&mut self, suggestions: &str) -> io::Result<()> {
        if self.state != SessionState::Idle {
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "===== Advisory Suggestions =====")?;
        writeln!(self.output, "{}", suggestions.trim())?;
        writeln!(self.output)?;
        self.state = SessionState::AwaitingTopChoice;

        loop {
            match self.state {
                SessionState::AwaitingTopChoice => self.handle_top_choice()?,
                SessionState::SelectingIssue => self.handle_issue_selection()?,
                SessionState::AwaitingContinue => self.handle_continue()?,
                SessionState::Idle | SessionState::Done => break,
            }
        }

        Ok(())
    }

    /// Read one trimmed line; `None` means EOF.
    fn read_token(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn handle_top_choice(&mut self) -> io::Result<()> {
        write!(
            self.output,
            "Apply any of the above suggestions? (auto/manual/select/skip): "
        )?;
        self.output.flush()?;

        let Some(token) = self.read_token()? else {
            self.state = SessionState::Done;
            return Ok(());
        };

        let choice = TopChoice::parse(&token);
        debug!(?choice, "top-level operator choice");
        self.state = match choice {
            TopChoice::Auto => {
                writeln!(
                    self.output,
                    ">> Automation is not implemented. Review the suggestions manually."
                )?;
                SessionState::Done
            }
            TopChoice::Manual => {
                writeln!(
                    self.output,
                    ">> Apply the suggestions manually, starting with anything flagged as critical."
                )?;
                SessionState::Done
            }
            TopChoice::Select => {
                self.print_catalog()?;
                SessionState::SelectingIssue
            }
            TopChoice::Other => {
                writeln!(self.output, ">> Skipping execution.")?;
                SessionState::Done
            }
        };
        Ok(())
    }

    fn print_catalog(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Available fix actions:")?;
        for action in self.catalog.actions() {
            writeln!(
                self.output,
                "  [{}] {} - {}",
                action.key, action.title, action.summary
            )?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn handle_issue_selection(&mut self) -> io::Result<()> {
        write!(self.output, "Issue number to fix: ")?;
        self.output.flush()?;

        let Some(token) = self.read_token()? else {
            self.state = SessionState::Done;
            return Ok(());
        };

        match self.catalog.lookup(&token) {
            Some(action) => {
                self.attempted.push(action.key);
                writeln!(self.output, ">> {}...", action.title)?;
                let outcome = self.catalog.execute(action, self.runner);
                self.report_outcome(&outcome)?;
            }
            None => {
                writeln!(
                    self.output,
                    ">> '{}' is not implemented for auto-fix, apply manually.",
                    token
                )?;
            }
        }

        self.state = SessionState::AwaitingContinue;
        Ok(())
    }

    fn handle_continue(&mut self) -> io::Result<()> {
        write!(self.output, "Fix another issue? (yes/no): ")?;
        self.output.flush()?;

        let token = self.read_token()?;
        self.state = match token.as_deref() {
            Some(t) if t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("y") => {
                SessionState::SelectingIssue
            }
            _ => SessionState::Done,
        };
        Ok(())
    }

    fn report_outcome(&mut self, outcome: &ActionOutcome) -> io::Result<()> {
        match outcome {
            ActionOutcome::PreconditionFailed { missing_tool } => {
                writeln!(
                    self.output,
                    ">> Cannot run this fix: '{}' is not installed.",
                    missing_tool
                )?;
            }
            ActionOutcome::Executed { steps, completed } => {
                for step in steps {
                    let glyph = if step.ok { "+" } else { "!" };
                    writeln!(self.output, "   {} {}", glyph, step.detail)?;
                }
                if *completed {
                    writeln!(self.output, ">> Fix applied.")?;
                } else {
                    writeln!(
                        self.output,
                        ">> Fix did not complete; remaining steps were skipped."
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_the_closed_token_set() {
        assert_eq!(TopChoice::parse("auto"), TopChoice::Auto);
        assert_eq!(TopChoice::parse(" MANUAL "), TopChoice::Manual);
        assert_eq!(TopChoice::parse("Select"), TopChoice::Select);
        assert_eq!(TopChoice::parse("skip"), TopChoice::Other);
        assert_eq!(TopChoice::parse(""), TopChoice::Other);
        assert_eq!(TopChoice::parse("selection"), TopChoice::Other);
    }
}
