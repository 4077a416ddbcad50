use serde::{Deserialize, Serialize};

/// Machine readable failure classification carried in `errorCode`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    Unauthorized,
    InternalFault,
    Unreachable,
    ExceededDeadline,
}

impl ErrorCode {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorCode::InvalidInput | ErrorCode::Unauthorized)
    }
}
