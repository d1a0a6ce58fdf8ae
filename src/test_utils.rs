//! Test utilities module
//!
//! Deterministic, in-memory stand-ins for the network: a mock chain that
//! executes the asset program against local state, produces blocks on
//! demand, and speaks the same wire encodings as a real node, so the full
//! decoding path is exercised without any network.
//!
//! Only compiled for tests or under the `test_utils` feature.

#![cfg(any(test, feature = "test_utils"))]

use crate::abi::selector;
use crate::asset::{ApprovalEvent, TransferEvent};
use crate::binding::decode::{encode_lang_failure, encode_rejection, encode_value};
use crate::config::SignerSet;
use crate::connection::{
    BlockProducer, CallData, CallRequest, ChainClient, ConnectionError, InclusionReceipt,
    RawCallOutcome, RawEvent, SignedSubmission, VmFailure,
};
use crate::errors::ContractError;
use crate::signer::verify_submission;
use crate::types::{
    AccountId, Balance, BlockHash, BlockNumber, BlockRef, Id, InclusionPolicy, Timestamp,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Event tags matching the asset ABI schema
const EVENT_TRANSFER: u8 = 0;
const EVENT_APPROVAL: u8 = 1;

/// Flat per-call gas charge of the mock engine
const GAS_PER_CALL: u64 = 1_000;

/// In-band failure code for unreadable call input
const CODE_COULD_NOT_READ_INPUT: u32 = 1;

/// Install a test subscriber; safe to call from every test
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The conventional dev signers
pub fn dev_signers() -> SignerSet {
    SignerSet::from_seeds(&["alice", "bob", "charlie", "dave"])
}

/// One deployed asset-program instance
#[derive(Debug, Clone, Default)]
struct AssetState {
    collection: Id,
    total_supply: Balance,
    balances: HashMap<AccountId, Balance>,
    allowances: HashMap<(AccountId, AccountId, Option<Id>), bool>,
    owners: HashMap<Id, AccountId>,
}

#[derive(Debug)]
struct ChainState {
    blocks: Vec<BlockRef>,
    /// Committed clock; what `clock_now` reports
    clock: Timestamp,
    /// Requested clock value, committed by the next produced block
    pending_clock: Option<Timestamp>,
    clock_authority: AccountId,
    nonces: HashMap<AccountId, u64>,
    contracts: HashMap<AccountId, AssetState>,
    /// Engine failure injected into the next contract execution
    forced_failure: Option<VmFailure>,
}

/// Deterministic in-memory chain
///
/// Implements both [`ChainClient`] and [`BlockProducer`]. Blocks are
/// produced per accepted contract submission (instant seal); the privileged
/// clock set is the exception: it lands in a block but the new value only
/// becomes observable once a later block is produced, which is exactly the
/// node behavior the time controller exists to handle. Inclusion and
/// finality coincide here, so both policies behave the same.
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<RwLock<ChainState>>,
}

impl MockChain {
    pub fn new(clock_authority: AccountId) -> Self {
        Self::with_genesis_clock(clock_authority, 1_000_000)
    }

    pub fn with_genesis_clock(clock_authority: AccountId, genesis_clock: Timestamp) -> Self {
        let genesis = BlockRef {
            number: 0,
            hash: block_hash_for(0, &BlockHash([0u8; 32])),
        };
        Self {
            state: Arc::new(RwLock::new(ChainState {
                blocks: vec![genesis],
                clock: genesis_clock,
                pending_clock: None,
                clock_authority,
                nonces: HashMap::new(),
                contracts: HashMap::new(),
                forced_failure: None,
            })),
        }
    }

    /// Number of blocks produced so far, genesis included
    pub fn block_count(&self) -> u64 {
        self.state.read().blocks.len() as u64
    }

    pub fn head(&self) -> BlockRef {
        *self
            .state
            .read()
            .blocks
            .last()
            .expect("genesis block always present")
    }

    /// Make the next contract execution abort at the engine level
    pub fn fail_next_contract_call(&self, failure: VmFailure) {
        self.state.write().forced_failure = Some(failure);
    }

    /// Register a token as owned by `owner` on a deployed instance
    pub fn seed_token(&self, contract: &AccountId, id: Id, owner: AccountId) {
        let mut state = self.state.write();
        if let Some(asset) = state.contracts.get_mut(contract) {
            asset.owners.insert(id, owner);
        }
    }
}

fn block_hash_for(number: BlockNumber, parent: &BlockHash) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(b"block");
    hasher.update(number.to_le_bytes());
    hasher.update(parent.0);
    BlockHash(hasher.finalize().into())
}

fn instance_address(deployer: &AccountId, nonce: u64) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(b"instance");
    hasher.update(deployer.0);
    hasher.update(nonce.to_le_bytes());
    AccountId(hasher.finalize().into())
}

impl ChainState {
    fn produce_block(&mut self) -> BlockRef {
        let parent = *self.blocks.last().expect("genesis block always present");
        let block = BlockRef {
            number: parent.number + 1,
            hash: block_hash_for(parent.number + 1, &parent.hash),
        };
        self.blocks.push(block);
        // Clock changes commit on block production
        if let Some(pending) = self.pending_clock.take() {
            self.clock = pending;
        }
        block
    }

    /// Run one contract call. Mutates the target instance in place; the
    /// simulation path hands in a scratch copy of state instead.
    fn execute_contract(
        &mut self,
        origin: AccountId,
        address: AccountId,
        input: &[u8],
        gas_limit: u64,
        events: &mut Vec<RawEvent>,
    ) -> RawCallOutcome {
        if let Some(failure) = self.forced_failure.take() {
            return RawCallOutcome {
                exec: Err(failure),
                gas_consumed: gas_limit,
            };
        }
        if gas_limit < GAS_PER_CALL {
            return RawCallOutcome {
                exec: Err(VmFailure::OutOfGas),
                gas_consumed: gas_limit,
            };
        }

        let Some(asset) = self.contracts.get_mut(&address) else {
            return RawCallOutcome {
                exec: Err(VmFailure::Trapped),
                gas_consumed: GAS_PER_CALL,
            };
        };

        let return_bytes = dispatch(asset, origin, input, events);
        RawCallOutcome {
            exec: Ok(return_bytes),
            gas_consumed: GAS_PER_CALL,
        }
    }
}

/// Decode the selector-prefixed input and run the matching method
fn dispatch(
    asset: &mut AssetState,
    origin: AccountId,
    input: &[u8],
    events: &mut Vec<RawEvent>,
) -> Vec<u8> {
    if input.len() < 4 {
        return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
    }
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&input[..4]);
    let args = &input[4..];

    if sel == selector("collection_id") {
        return encode_value(&asset.collection);
    }
    if sel == selector("balance_of") {
        let Ok((owner,)) = bincode::deserialize::<(AccountId,)>(args) else {
            return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
        };
        return encode_value(&asset.balances.get(&owner).copied().unwrap_or(0));
    }
    if sel == selector("owner_of") {
        let Ok((id,)) = bincode::deserialize::<(Id,)>(args) else {
            return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
        };
        return encode_value(&asset.owners.get(&id).copied());
    }
    if sel == selector("allowance") {
        let Ok((owner, operator, id)) =
            bincode::deserialize::<(AccountId, AccountId, Option<Id>)>(args)
        else {
            return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
        };
        let granted = asset
            .allowances
            .get(&(owner, operator, id.clone()))
            .copied()
            // A blanket approval covers token-specific checks
            .or_else(|| {
                id.is_some()
                    .then(|| asset.allowances.get(&(owner, operator, None)).copied())
                    .flatten()
            })
            .unwrap_or(false);
        return encode_value(&granted);
    }
    if sel == selector("total_supply") {
        return encode_value(&asset.total_supply);
    }
    if sel == selector("approve") {
        let Ok((operator, id, approved)) =
            bincode::deserialize::<(AccountId, Option<Id>, bool)>(args)
        else {
            return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
        };
        return approve(asset, origin, operator, id, approved, events);
    }
    if sel == selector("transfer") {
        let Ok((to, value, data)) = bincode::deserialize::<(AccountId, Balance, Vec<u8>)>(args)
        else {
            return encode_lang_failure(CODE_COULD_NOT_READ_INPUT);
        };
        return transfer(asset, origin, to, value, &data, events);
    }

    encode_lang_failure(CODE_COULD_NOT_READ_INPUT)
}

fn approve(
    asset: &mut AssetState,
    origin: AccountId,
    operator: AccountId,
    id: Option<Id>,
    approved: bool,
    events: &mut Vec<RawEvent>,
) -> Vec<u8> {
    if origin == operator {
        return encode_rejection(&ContractError::SelfApprove);
    }
    if let Some(id) = &id {
        match asset.owners.get(id) {
            None => return encode_rejection(&ContractError::TokenNotExists),
            Some(owner) if *owner != origin => {
                return encode_rejection(&ContractError::NotApproved)
            }
            Some(_) => {}
        }
    }
    asset
        .allowances
        .insert((origin, operator, id.clone()), approved);
    events.push(RawEvent {
        tag: EVENT_APPROVAL,
        data: bincode::serialize(&ApprovalEvent {
            owner: origin,
            operator,
            id,
            approved,
        })
        .unwrap_or_default(),
    });
    encode_value(&())
}

fn transfer(
    asset: &mut AssetState,
    origin: AccountId,
    to: AccountId,
    value: Balance,
    data: &[u8],
    events: &mut Vec<RawEvent>,
) -> Vec<u8> {
    // The auxiliary payload reaches the receiver-side check; the mock
    // receiver refuses one well-known payload
    if data == b"reject" {
        return encode_rejection(&ContractError::SafeTransferCheckFailed(
            "receiver refused the transfer".to_string(),
        ));
    }
    let from_balance = asset.balances.get(&origin).copied().unwrap_or(0);
    if from_balance < value {
        return encode_rejection(&ContractError::Custom("InsufficientBalance".to_string()));
    }
    asset.balances.insert(origin, from_balance - value);
    *asset.balances.entry(to).or_insert(0) += value;
    events.push(RawEvent {
        tag: EVENT_TRANSFER,
        data: bincode::serialize(&TransferEvent {
            from: Some(origin),
            to: Some(to),
            value,
        })
        .unwrap_or_default(),
    });
    encode_value(&())
}

#[async_trait]
impl ChainClient for MockChain {
    async fn clock_now(&self) -> Result<Timestamp, ConnectionError> {
        Ok(self.state.read().clock)
    }

    async fn block_hash(&self, number: BlockNumber) -> Result<Option<BlockHash>, ConnectionError> {
        Ok(self
            .state
            .read()
            .blocks
            .iter()
            .find(|b| b.number == number)
            .map(|b| b.hash))
    }

    async fn state_query(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ConnectionError> {
        let state = self.state.read();
        match key {
            b"clock" => Ok(Some(
                bincode::serialize(&state.clock)
                    .map_err(|e| ConnectionError::Codec(e.to_string()))?,
            )),
            _ => Ok(None),
        }
    }

    async fn account_nonce(&self, account: &AccountId) -> Result<u64, ConnectionError> {
        Ok(self.state.read().nonces.get(account).copied().unwrap_or(0))
    }

    async fn simulate(&self, call: &CallRequest) -> Result<RawCallOutcome, ConnectionError> {
        let CallData::Contract {
            address,
            input,
            gas_limit,
            ..
        } = &call.data
        else {
            return Err(ConnectionError::Codec(
                "only contract calls can be simulated".to_string(),
            ));
        };

        // Evaluate against a scratch copy; repeated simulation never mutates
        let mut state = self.state.write();
        let mut scratch = ChainState {
            blocks: state.blocks.clone(),
            clock: state.clock,
            pending_clock: state.pending_clock,
            clock_authority: state.clock_authority,
            nonces: HashMap::new(),
            contracts: state.contracts.clone(),
            forced_failure: state.forced_failure.take(),
        };
        let mut discarded_events = Vec::new();
        Ok(scratch.execute_contract(
            call.origin,
            *address,
            input,
            *gas_limit,
            &mut discarded_events,
        ))
    }

    async fn submit(
        &self,
        submission: &SignedSubmission,
        _policy: InclusionPolicy,
    ) -> Result<InclusionReceipt, ConnectionError> {
        let mut state = self.state.write();

        let expected = state.nonces.get(&submission.signer).copied().unwrap_or(0);
        if submission.nonce != expected {
            return Err(ConnectionError::inclusion_rejected(format!(
                "nonce {} does not match expected {}",
                submission.nonce, expected
            )));
        }
        if !verify_submission(submission) {
            return Err(ConnectionError::inclusion_rejected("invalid signature"));
        }
        // A refused privileged call is never included, so it must not
        // consume the nonce either
        if matches!(submission.call, CallData::SetClock { .. })
            && submission.signer != state.clock_authority
        {
            return Err(ConnectionError::inclusion_rejected(
                "clock set requires the designated authority",
            ));
        }
        state.nonces.insert(submission.signer, expected + 1);

        match &submission.call {
            CallData::Contract {
                address,
                input,
                gas_limit,
                ..
            } => {
                let mut events = Vec::new();
                let exec = state.execute_contract(
                    submission.signer,
                    *address,
                    input,
                    *gas_limit,
                    &mut events,
                );
                let block = state.produce_block();
                Ok(InclusionReceipt {
                    block,
                    index: 0,
                    exec: Some(exec),
                    events,
                    instantiated: None,
                })
            }
            CallData::Instantiate { input, .. } => {
                let Ok((initial_supply,)) = bincode::deserialize::<(Balance,)>(input) else {
                    return Err(ConnectionError::Codec(
                        "constructor arguments did not decode".to_string(),
                    ));
                };
                let address = instance_address(&submission.signer, expected);
                let mut asset = AssetState {
                    collection: Id::Bytes(address.0[..4].to_vec()),
                    total_supply: initial_supply,
                    ..Default::default()
                };
                asset.balances.insert(submission.signer, initial_supply);
                state.contracts.insert(address, asset);

                let events = vec![RawEvent {
                    tag: EVENT_TRANSFER,
                    data: bincode::serialize(&TransferEvent {
                        from: None,
                        to: Some(submission.signer),
                        value: initial_supply,
                    })
                    .unwrap_or_default(),
                }];
                let block = state.produce_block();
                Ok(InclusionReceipt {
                    block,
                    index: 0,
                    exec: None,
                    events,
                    instantiated: Some(address),
                })
            }
            CallData::SetClock { timestamp } => {
                // The block carrying the set still runs at the old clock;
                // the new value commits with the next produced block
                let block = state.produce_block();
                state.pending_clock = Some(*timestamp);
                Ok(InclusionReceipt {
                    block,
                    index: 0,
                    exec: None,
                    events: Vec::new(),
                    instantiated: None,
                })
            }
        }
    }
}

#[async_trait]
impl BlockProducer for MockChain {
    async fn produce_block(&self) -> Result<BlockRef, ConnectionError> {
        Ok(self.state.write().produce_block())
    }
}
