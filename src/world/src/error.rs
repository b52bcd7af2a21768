#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no such player")]
    PlayerNotFound,
}
