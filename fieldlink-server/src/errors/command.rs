#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Command name is missing")]
    MissingCommand,
}
