#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("end of packet")]
    Eof,
    #[error("var-int is wider than 5 bytes")]
    VarIntTooLong,
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("packet id {0} out of range")]
    IdOutOfRange(i32),
    #[error("handler error: {0}")]
    Handler(String),
}

impl From<strata_proto::Error> for SessionError {
    fn from(e: strata_proto::Error) -> Self {
        match e {
            strata_proto::Error::Eof => SessionError::Eof,
            strata_proto::Error::VarIntTooLong => SessionError::VarIntTooLong,
            strata_proto::Error::InvalidUtf8 => SessionError::Handler("invalid utf8".to_string()),
            strata_proto::Error::Io(io) => SessionError::Io(io),
        }
    }
}
