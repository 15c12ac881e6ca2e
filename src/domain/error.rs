//! Domain error types.
//!
//! Trade rejections (insufficient cash/shares) are deliberately *not* errors;
//! they are modelled as [`super::order::RejectReason`] values because they are
//! an expected outcome of normal trading, not a fault.

/// Top-level error type for papertrade.
#[derive(Debug, thiserror::Error)]
pub enum PapertradeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("corrupt state file {file}: {reason}")]
    CorruptState { file: String, reason: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("no order with id {id}")]
    UnknownOrder { id: u64 },

    #[error("order {id} is not pending and cannot be cancelled")]
    OrderNotPending { id: u64 },

    #[error("invalid symbol list: {reason}")]
    SymbolList { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PapertradeError> for std::process::ExitCode {
    fn from(err: &PapertradeError) -> Self {
        let code: u8 = match err {
            PapertradeError::Io(_) => 1,
            PapertradeError::ConfigParse { .. } | PapertradeError::ConfigInvalid { .. } => 2,
            PapertradeError::CorruptState { .. } => 3,
            PapertradeError::UnknownSymbol { .. }
            | PapertradeError::InvalidOrder { .. }
            | PapertradeError::UnknownOrder { .. }
            | PapertradeError::OrderNotPending { .. } => 4,
            PapertradeError::SymbolList { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn error_messages() {
        let err = PapertradeError::UnknownSymbol {
            symbol: "XYZ".into(),
        };
        assert_eq!(err.to_string(), "unknown symbol: XYZ");

        let err = PapertradeError::InvalidOrder {
            reason: "shares must be positive".into(),
        };
        assert_eq!(err.to_string(), "invalid order: shares must be positive");
    }

    #[test]
    fn corrupt_state_message_includes_file() {
        let err = PapertradeError::CorruptState {
            file: "portfolio.json".into(),
            reason: "unexpected end of input".into(),
        };
        assert!(err.to_string().contains("portfolio.json"));
    }

    #[test]
    fn exit_code_mapping() {
        let io_err = PapertradeError::Io(std::io::Error::other("boom"));
        let _code: ExitCode = (&io_err).into();
    }
}
