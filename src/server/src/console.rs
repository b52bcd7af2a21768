use std::io::Write;

use flume::Sender;
use rustyline::config::Configurer;
use rustyline::{Cmd, KeyCode, KeyEvent, Modifiers};
use tokio_util::sync::CancellationToken;

const HISTORY_FILE_PATH: &str = ".strata_console_history";

/// Reads lines from stdin on a blocking thread and forwards them as raw
/// command text; `main` owns parsing and dispatch against the world.
pub struct Console {
    commands: Sender<String>,
    cancel: CancellationToken,
}

impl Console {
    pub fn new(commands: Sender<String>, cancel: CancellationToken) -> Self {
        Self { commands, cancel }
    }

    pub fn serve(self) {
        let mut rl = rustyline::DefaultEditor::new().expect("terminal editor init");
        rl.set_auto_add_history(true);
        let _ = rl.load_history(HISTORY_FILE_PATH);

        rl.bind_sequence(KeyEvent(KeyCode::Up, Modifiers::NONE), Cmd::PreviousHistory);
        rl.bind_sequence(KeyEvent(KeyCode::Down, Modifiers::NONE), Cmd::NextHistory);

        loop {
            let Ok(line) = rl.readline("> ") else {
                self.cancel.cancel();
                return;
            };

            let input = line.trim();

            if input.is_empty() {
                continue;
            }

            if input == "exit" {
                self.cancel.cancel();
                return;
            }

            if input.eq_ignore_ascii_case("cls") {
                print!("\x1B[2J\x1B[1;1H");
                let _ = std::io::stdout().flush();
                continue;
            }

            if self.commands.send(input.to_owned()).is_err() {
                return;
            }

            let _ = rl.save_history(HISTORY_FILE_PATH);
        }
    }
}
