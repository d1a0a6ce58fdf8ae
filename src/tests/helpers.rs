//! Shared fixtures for the harness test suite

use crate::asset::AssetContract;
use crate::config::{CallDefaults, SignerSet};
use crate::connection::ChainClient;
use crate::signer::Signer;
use crate::test_utils::{dev_signers, init_tracing, MockChain};
use crate::types::Balance;
use std::sync::Arc;

/// A deployed asset program on a fresh mock chain
pub struct TestEnv {
    pub chain: MockChain,
    pub client: Arc<dyn ChainClient>,
    pub signers: SignerSet,
    pub token: AssetContract,
}

impl TestEnv {
    pub fn owner(&self) -> Arc<Signer> {
        self.signers.get(0).expect("dev signer set is non-empty")
    }

    pub fn recipient(&self) -> Arc<Signer> {
        self.signers.get(1).expect("dev signer set has a recipient")
    }

    pub fn other(&self) -> Arc<Signer> {
        self.signers.get(2).expect("dev signer set has an other")
    }
}

/// Deploy an asset program with `initial_supply` minted to the first dev
/// signer
pub async fn deploy_env(initial_supply: Balance) -> TestEnv {
    init_tracing();
    let signers = dev_signers();
    let authority = signers
        .clock_authority()
        .expect("dev signer set has an authority");
    let chain = MockChain::new(authority.account_id());
    let client: Arc<dyn ChainClient> = Arc::new(chain.clone());
    let owner = signers.get(0).expect("dev signer set is non-empty");

    let token = AssetContract::deploy(
        Arc::clone(&client),
        owner,
        initial_supply,
        CallDefaults::default(),
    )
    .await
    .expect("deploy against the mock chain succeeds");

    TestEnv {
        chain,
        client,
        signers,
        token,
    }
}
