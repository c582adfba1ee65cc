use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};

pub struct NewCommand;

#[async_trait]
impl Command for NewCommand {
    fn name(&self) -> &str {
        "/new"
    }

    fn description(&self) -> &str {
        "drop the current problem and load another image"
    }

    async fn execute(&self, _info: &SessionInfo<'_>) -> CommandResult {
        CommandResult::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[tokio::test]
    async fn returns_reset() {
        assert!(matches!(
            NewCommand.execute(&test_info()).await,
            CommandResult::Reset
        ));
    }
}
