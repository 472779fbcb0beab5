use concordium_std::*;

#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// Metadata URL of every token.
    pub metadata_url: String,
}
