//! Line to command dispatch
//!
//! Unlike the producer, which shows the raw code when a key has no
//! translation, the dispatcher does nothing for an unmapped key.

use std::convert::Infallible;
use std::time::Instant;

use crate::error::Result;
use crate::input::RepeatDetector;
use crate::protocol::ProtocolLine;
use crate::table::TranslationTable;

use super::command::CommandRunner;
use super::subscriber::ResilientSubscriber;

/// What to do with matching lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Run the mapped command
    Execute,
    /// Print every line, like LIRC's `irw`
    Print,
}

/// Result of handling one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Fewer than four tokens, or a bad repeat token
    Malformed,
    /// Tag did not match
    ForeignTag(String),
    /// Repeated press; only fresh presses run commands
    Repeated,
    /// No command mapped to this name
    Unmapped(String),
    /// Command ran
    Executed { name: String, command: String },
    /// Command could not be run or exited non-zero
    Failed { command: String, error: String },
    /// Line was printed
    Printed(ProtocolLine),
}

/// Parses lines and triggers mapped commands
pub struct ActionDispatcher<C> {
    table: TranslationTable,
    runner: C,
    mode: DispatchMode,
    detector: RepeatDetector,
}

impl<C: CommandRunner> ActionDispatcher<C> {
    /// Create a dispatcher
    pub fn new(table: TranslationTable, runner: C, mode: DispatchMode, detector: RepeatDetector) -> Self {
        Self {
            table,
            runner,
            mode,
            detector,
        }
    }

    /// Get the command runner
    pub fn runner(&self) -> &C {
        &self.runner
    }

    /// Handle one received line
    pub async fn handle_line(&mut self, line: &str) -> DispatchOutcome {
        self.handle_line_at(line, Instant::now()).await
    }

    /// Handle one received line that arrived at `now`
    pub async fn handle_line_at(&mut self, line: &str, now: Instant) -> DispatchOutcome {
        let Some(parsed) = ProtocolLine::parse(line) else {
            tracing::debug!(line, "Unparseable line ignored");
            return DispatchOutcome::Malformed;
        };

        if !parsed.has_source_tag() {
            tracing::debug!(tag = %parsed.tag, "Wrong ID, code ignored");
            return DispatchOutcome::ForeignTag(parsed.tag);
        }

        if self.mode == DispatchMode::Print {
            println!("{}", parsed.columns());
            return DispatchOutcome::Printed(parsed);
        }

        // Every line counts toward the local window, even ones already marked
        let locally_repeated = self.detector.classify(now).is_repeat();
        if parsed.repeat != 0 || locally_repeated {
            tracing::debug!(name = %parsed.name, "Repetition ignored");
            return DispatchOutcome::Repeated;
        }

        let Some(command) = self.table.lookup(&parsed.name) else {
            tracing::debug!(name = %parsed.name, "No command mapped");
            return DispatchOutcome::Unmapped(parsed.name);
        };
        let command = command.to_owned();

        tracing::info!(name = %parsed.name, "executing by IRMP ({})", command);
        match self.runner.run(&command).await {
            Ok(()) => DispatchOutcome::Executed {
                name: parsed.name,
                command,
            },
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Command failed");
                DispatchOutcome::Failed {
                    command,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Dispatch lines from `subscriber` for ever
    pub async fn run(mut self, mut subscriber: ResilientSubscriber) -> Result<Infallible> {
        if self.mode == DispatchMode::Print {
            println!("irmpdata\t|repeat\t|irmp_codes\t|id");
        }

        tracing::info!("Started");

        loop {
            let line = subscriber.next_line().await?;
            self.handle_line(&line).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct RecordingRunner {
        commands: RefCell<Vec<String>>,
        fail: bool,
    }

    impl CommandRunner for RecordingRunner {
        async fn run(&self, command: &str) -> io::Result<()> {
            self.commands.borrow_mut().push(command.to_owned());
            if self.fail {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such command"))
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher(mode: DispatchMode) -> ActionDispatcher<RecordingRunner> {
        let table = TranslationTable::parse("KEY_POWER poweroff\nliving_room_power lights_toggle\n");
        ActionDispatcher::new(table, RecordingRunner::default(), mode, RepeatDetector::disabled())
    }

    #[tokio::test]
    async fn test_executes_mapped_command() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        let outcome = dispatcher
            .handle_line("010102030400 0 living_room_power IRMP")
            .await;

        assert_eq!(
            outcome,
            DispatchOutcome::Executed {
                name: "living_room_power".into(),
                command: "lights_toggle".into(),
            }
        );
        assert_eq!(*dispatcher.runner().commands.borrow(), vec!["lights_toggle"]);
    }

    #[tokio::test]
    async fn test_tag_matched_case_insensitively() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        let outcome = dispatcher.handle_line("0 0 KEY_POWER irmp").await;
        assert!(matches!(outcome, DispatchOutcome::Executed { .. }));
    }

    #[tokio::test]
    async fn test_foreign_tag_ignored() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        let outcome = dispatcher.handle_line("0000000000000010 0 KEY_POWER devinput").await;

        assert_eq!(outcome, DispatchOutcome::ForeignTag("devinput".into()));
        assert!(dispatcher.runner().commands.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_token_ignored() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        let outcome = dispatcher.handle_line("010102030401 1 KEY_POWER IRMP").await;

        assert_eq!(outcome, DispatchOutcome::Repeated);
        assert!(dispatcher.runner().commands.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_local_repeat_window() {
        let start = Instant::now();
        let table = TranslationTable::parse("KEY_POWER poweroff\n");
        let detector = RepeatDetector::starting_at(Duration::from_millis(300), start);
        let mut dispatcher = ActionDispatcher::new(
            table,
            RecordingRunner::default(),
            DispatchMode::Execute,
            detector,
        );

        let line = "0 0 KEY_POWER IRMP";
        let first = dispatcher.handle_line_at(line, start + Duration::from_secs(1)).await;
        let second = dispatcher
            .handle_line_at(line, start + Duration::from_millis(1100))
            .await;
        let third = dispatcher.handle_line_at(line, start + Duration::from_secs(2)).await;

        assert!(matches!(first, DispatchOutcome::Executed { .. }));
        assert_eq!(second, DispatchOutcome::Repeated);
        assert!(matches!(third, DispatchOutcome::Executed { .. }));
        assert_eq!(dispatcher.runner().commands.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_repeat_token_extends_local_window() {
        let start = Instant::now();
        let table = TranslationTable::parse("KEY_POWER poweroff\n");
        let detector = RepeatDetector::starting_at(Duration::from_millis(300), start);
        let mut dispatcher = ActionDispatcher::new(
            table,
            RecordingRunner::default(),
            DispatchMode::Execute,
            detector,
        );

        let fresh = "0 0 KEY_POWER IRMP";
        let marked = "1 1 KEY_POWER IRMP";
        let first = dispatcher.handle_line_at(fresh, start + Duration::from_secs(1)).await;
        let second = dispatcher
            .handle_line_at(marked, start + Duration::from_millis(1200))
            .await;
        let third = dispatcher
            .handle_line_at(fresh, start + Duration::from_millis(1400))
            .await;

        assert!(matches!(first, DispatchOutcome::Executed { .. }));
        assert_eq!(second, DispatchOutcome::Repeated);
        assert_eq!(third, DispatchOutcome::Repeated);
        assert_eq!(dispatcher.runner().commands.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_unmapped_is_noop() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        let outcome = dispatcher.handle_line("02ff00001500 0 02ff00001500 IRMP").await;

        assert_eq!(outcome, DispatchOutcome::Unmapped("02ff00001500".into()));
        assert!(dispatcher.runner().commands.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ignored() {
        let mut dispatcher = dispatcher(DispatchMode::Execute);

        assert_eq!(dispatcher.handle_line("").await, DispatchOutcome::Malformed);
        assert_eq!(
            dispatcher.handle_line("010102030400 0 KEY_POWER").await,
            DispatchOutcome::Malformed
        );
        assert!(dispatcher.runner().commands.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_command_failure_reported() {
        let table = TranslationTable::parse("KEY_POWER poweroff\n");
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };
        let mut dispatcher =
            ActionDispatcher::new(table, runner, DispatchMode::Execute, RepeatDetector::disabled());

        let outcome = dispatcher.handle_line("0 0 KEY_POWER IRMP").await;
        assert!(matches!(outcome, DispatchOutcome::Failed { ref command, .. } if command == "poweroff"));
    }

    #[tokio::test]
    async fn test_print_mode_runs_nothing() {
        let mut dispatcher = dispatcher(DispatchMode::Print);

        // Repeats are printed too
        let outcome = dispatcher.handle_line("010102030401 1 KEY_POWER IRMP").await;

        assert!(matches!(outcome, DispatchOutcome::Printed(ref line) if line.repeat == 1));
        assert!(dispatcher.runner().commands.borrow().is_empty());
    }
}
