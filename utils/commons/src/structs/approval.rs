use super::*;

/// Parameter of the collection `approve` function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct ApproveParams {
    pub token_id: ContractTokenId,
    /// Address allowed to transfer the token. `None` clears the approval.
    pub approved: Option<Address>,
}

/// Per-token approval event logged by collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct ApprovalEvent {
    pub token_id: ContractTokenId,
    pub owner: Address,
    pub approved: Option<Address>,
}
