use super::*;

/// The custom errors the contracts can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Auction creation parameters are out of range (Error code: -4).
    InvalidAuctionParameters,
    /// No auction with the given id (Error code: -5).
    AuctionNotFound,
    /// Auction stopped (Error code: -6).
    AuctionStopped,
    /// Auction end time has passed without a sale (Error code: -7).
    AuctionExpired,
    /// Payment is below the current price (Error code: -8).
    InsufficientPayment,
    /// An outbound transfer was refused by its recipient (Error code: -9).
    TransferRejected,
    /// Only account addresses can call this function (Error code: -10).
    OnlyAccountAddress,
    /// Unauthorized (Error code: -11).
    Unauthorized,
    /// Not Found (Error code: -12).
    NotFound,
    /// Failed to invoke a contract (Error code: -13).
    InvokeContractError,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to contract invocations to CustomContractError.
impl<T> From<CallContractError<T>> for CustomContractError {
    fn from(_cce: CallContractError<T>) -> Self {
        Self::InvokeContractError
    }
}

/// Mapping errors related to transfers to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::TransferRejected
    }
}
