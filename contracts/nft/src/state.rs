use commons::{ContractError, ContractResult, ContractTokenAmount, ContractTokenId, CustomContractError};
use concordium_std::*;

/// Data tracked for a single token.
#[derive(Debug, Serialize, SchemaType, Clone)]
pub struct TokenData {
    /// Current owner of the token.
    pub owner: Address,
    /// Metadata URL, fixed at mint time.
    pub url: String,
}

/// The state for each address.
#[derive(Serial, DeserialWithState, Deletable, StateClone)]
#[concordium(state_parameter = "S")]
pub struct AddressState<S: HasStateApi> {
    /// Tokens currently owned by this address.
    pub owned_tokens: StateSet<ContractTokenId, S>,
    /// The addresses which are currently enabled as operators for this
    /// address.
    pub operators: StateSet<Address, S>,
}

impl<S: HasStateApi> AddressState<S> {
    fn empty(state_builder: &mut StateBuilder<S>) -> Self {
        AddressState {
            owned_tokens: state_builder.new_set(),
            operators: state_builder.new_set(),
        }
    }
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Ownership and metadata for every minted token.
    pub tokens: StateMap<ContractTokenId, TokenData, S>,
    /// The state for each address.
    pub addresses: StateMap<Address, AddressState<S>, S>,
}

// Functions for creating, updating and querying the contract state.
impl<S: HasStateApi> State<S> {
    /// Creates an empty state with no tokens.
    pub fn empty(state_builder: &mut StateBuilder<S>) -> Self {
        State {
            tokens: state_builder.new_map(),
            addresses: state_builder.new_map(),
        }
    }

    /// Mint a new token to the given owner. Fails if the token ID is
    /// already taken.
    pub fn mint(
        &mut self,
        token_id: ContractTokenId,
        url: String,
        owner: Address,
        state_builder: &mut StateBuilder<S>,
    ) -> ContractResult<()> {
        ensure!(
            self.tokens.get(&token_id).is_none(),
            CustomContractError::TokenIdAlreadyExists.into()
        );
        self.tokens.insert(token_id.clone(), TokenData { owner, url });
        let mut owner_state = self
            .addresses
            .entry(owner)
            .or_insert_with(|| AddressState::empty(state_builder));
        owner_state.owned_tokens.insert(token_id);
        Ok(())
    }

    /// Check that the token ID currently exists in this contract.
    #[inline(always)]
    pub fn contains_token(&self, token_id: &ContractTokenId) -> bool {
        self.tokens.get(token_id).is_some()
    }

    /// Get the current balance of a given token ID for a given address.
    /// Since this contract only contains NFTs, the balance is always
    /// either 1 or 0.
    pub fn balance(
        &self,
        token_id: &ContractTokenId,
        address: &Address,
    ) -> ContractResult<ContractTokenAmount> {
        ensure!(self.contains_token(token_id), ContractError::InvalidTokenId);
        let balance = self
            .addresses
            .get(address)
            .map(|address_state| u64::from(address_state.owned_tokens.contains(token_id)))
            .unwrap_or(0);
        Ok(balance.into())
    }

    /// Get the current owner of a token.
    pub fn owner_of(&self, token_id: &ContractTokenId) -> ContractResult<Address> {
        self.tokens
            .get(token_id)
            .map(|data| data.owner)
            .ok_or(ContractError::InvalidTokenId)
    }

    /// Get the metadata URL of a token.
    pub fn metadata_url(&self, token_id: &ContractTokenId) -> ContractResult<String> {
        self.tokens
            .get(token_id)
            .map(|data| data.url.clone())
            .ok_or(ContractError::InvalidTokenId)
    }

    /// Check if a given address is an operator of a given owner address.
    pub fn is_operator(&self, address: &Address, owner: &Address) -> bool {
        self.addresses
            .get(owner)
            .map(|address_state| address_state.operators.contains(address))
            .unwrap_or(false)
    }

    /// Update the state adding a new operator for a given address.
    /// Succeeds even if the `operator` is already an operator for the
    /// `address`.
    pub fn add_operator(
        &mut self,
        owner: &Address,
        operator: &Address,
        state_builder: &mut StateBuilder<S>,
    ) {
        let mut owner_state = self
            .addresses
            .entry(*owner)
            .or_insert_with(|| AddressState::empty(state_builder));
        owner_state.operators.insert(*operator);
    }

    /// Update the state removing an operator for a given address.
    /// Succeeds even if the `operator` is _not_ an operator for the
    /// `address`.
    pub fn remove_operator(&mut self, owner: &Address, operator: &Address) {
        self.addresses
            .get_mut(owner)
            .map(|mut address_state| address_state.operators.remove(operator));
    }

    /// Move a token from one address to another. An amount of 0 is a
    /// no-op; an NFT exists in a single copy, so any amount over 1 cannot
    /// be covered and the `from` address must own the token.
    pub fn transfer(
        &mut self,
        token_id: &ContractTokenId,
        amount: ContractTokenAmount,
        from: &Address,
        to: &Address,
        state_builder: &mut StateBuilder<S>,
    ) -> ContractResult<()> {
        ensure!(self.contains_token(token_id), ContractError::InvalidTokenId);
        if amount == 0.into() {
            return Ok(());
        }
        ensure!(amount == 1.into(), ContractError::InsufficientFunds);
        {
            let mut data = self
                .tokens
                .get_mut(token_id)
                .ok_or(ContractError::InvalidTokenId)?;
            ensure!(data.owner == *from, ContractError::InsufficientFunds);
            data.owner = *to;
        }
        self.addresses
            .get_mut(from)
            .map(|mut address_state| address_state.owned_tokens.remove(token_id));
        let mut to_state = self
            .addresses
            .entry(*to)
            .or_insert_with(|| AddressState::empty(state_builder));
        to_state.owned_tokens.insert(token_id.clone());
        Ok(())
    }

    /// All tokens currently owned by the given address.
    pub fn owned_tokens(&self, address: &Address) -> Vec<ContractTokenId> {
        self.addresses
            .get(address)
            .map(|address_state| address_state.owned_tokens.iter().map(|id| id.clone()).collect())
            .unwrap_or_default()
    }
}
