use super::*;

/// A token globally identified by its collection contract and the token ID within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct Token {
    /// Collection contract address.
    pub contract: ContractAddress,
    /// Token identifier inside the collection.
    pub id: ContractTokenId,
}

impl Token {
    pub fn new(contract: ContractAddress, id: ContractTokenId) -> Self {
        Self { contract, id }
    }
}
