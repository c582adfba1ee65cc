use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::client::history::excerpt;
use crate::client::render::to_terminal;

pub struct HistoryCommand;

#[async_trait]
impl Command for HistoryCommand {
    fn name(&self) -> &str {
        "/history"
    }

    fn description(&self) -> &str {
        "list recently solved problems"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        let Some(store) = info.history else {
            println!("  history is disabled");
            return CommandResult::Handled;
        };

        match store.list() {
            Ok(entries) if entries.is_empty() => println!("  まだ記録はありません。"),
            Ok(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    let text = excerpt(&to_terminal(&entry.result)).replace('\n', " ");
                    println!("  {}. [{}] {}", i + 1, entry.timestamp, text);
                }
            }
            Err(e) => eprintln!("  ✗ failed to read history: {e}"),
        }
        CommandResult::Handled
    }
}
