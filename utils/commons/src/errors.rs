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
    /// Failed to invoke a contract (Error code: -4).
    InvokeContractError,
    /// Failed to invoke a transfer (Error code: -5).
    InvokeTransferError,
    /// Unauthorized (Error code: -6)
    Unauthorized,
    /// Invoked contract does not behave like a CIS-2 collection (Error code: -7)
    Incompatible,
    /// Only account addresses can perform this action (Error code: -8).
    OnlyAccountAddress,
    /// Token is already listed for sale (Error code: -9).
    AlreadyListed,
    /// Token is not listed for sale (Error code: -10).
    NotListed,
    /// Listing price must be above zero (Error code: -11).
    PriceMustBeAboveZero,
    /// Sender does not own the token (Error code: -12).
    NotOwner,
    /// Marketplace is neither an operator of the owner nor approved for the token (Error code: -13).
    NotApprovedForMarketplace,
    /// Paid amount is below the listing price (Error code: -14).
    PriceNotMet,
    /// Nothing to withdraw (Error code: -15).
    NoProceeds,
    /// Approving the token owner itself (Error code: -16).
    ApprovalToOwner,
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

/// Mapping errors related to CCD transfers to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::InvokeTransferError
    }
}

/// Mapping CustomContractError to ContractError
impl From<CustomContractError> for ContractError {
    fn from(c: CustomContractError) -> Self {
        Cis2Error::Custom(c)
    }
}

/// Failure of a read-only query to another contract.
#[derive(Debug)]
pub enum ContractReadError<R> {
    /// The invocation itself failed.
    Call(CallContractError<R>),
    /// The contract returned no value.
    Compatibility,
    /// The returned value could not be parsed.
    Parse,
}
