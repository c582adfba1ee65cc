use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["/q", "/exit", "exit", "終了"]
    }

    fn description(&self) -> &str {
        "leave sensei (history stays on disk)"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        if let Some(store) = info.history {
            match store.len() {
                Ok(0) => {}
                Ok(n) => println!("  {n} problem(s) kept in history"),
                Err(e) => eprintln!("  ✗ failed to read history: {e}"),
            }
        }
        CommandResult::Quit
    }
}
