use super::*;

/// A token identified across registries: the registry contract address
/// plus the token ID within that registry.
#[derive(Debug, Serialize, SchemaType, Hash, PartialEq, Eq, Clone)]
pub struct Token {
    pub contract: ContractAddress,
    pub id: ContractTokenId,
}
