//! Clock advancement protocol: convergence, staleness, explicit failure

use super::helpers::deploy_env;
use crate::connection::{BlockProducer, CallData, ChainClient, ConnectionError};
use crate::test_utils::{dev_signers, init_tracing, MockChain};
use crate::time_control::{TimeControlError, TimeController};
use crate::types::{BlockRef, InclusionPolicy};
use async_trait::async_trait;
use std::sync::Arc;

fn controller(env: &super::helpers::TestEnv) -> TimeController {
    TimeController::new(
        Arc::clone(&env.client),
        Arc::new(env.chain.clone()),
        env.signers.clock_authority().unwrap(),
    )
}

#[tokio::test]
async fn advance_clock_converges_exactly() {
    let env = deploy_env(1_000).await;
    let time = controller(&env);
    let start = env.client.clock_now().await.unwrap();

    let reached = time.advance_clock(5_000).await.unwrap();
    assert_eq!(reached, start + 5_000);
    assert_eq!(env.client.clock_now().await.unwrap(), start + 5_000);
}

#[tokio::test]
async fn zero_delta_advance_is_a_no_op_that_still_verifies() {
    let env = deploy_env(1_000).await;
    let time = controller(&env);
    let start = env.client.clock_now().await.unwrap();

    let reached = time.advance_clock(0).await.unwrap();
    assert_eq!(reached, start);
    assert_eq!(env.client.clock_now().await.unwrap(), start);
}

#[tokio::test]
async fn set_clock_is_stale_until_a_block_is_produced() {
    init_tracing();
    let signers = dev_signers();
    let authority = signers.clock_authority().unwrap();
    let chain = MockChain::with_genesis_clock(authority.account_id(), 10_000);

    // Submit the privileged set directly, without forcing a block
    let nonce = 0;
    let submission =
        authority.sign_submission(CallData::SetClock { timestamp: 99_000 }, nonce);
    chain
        .submit(&submission, InclusionPolicy::InBlock)
        .await
        .unwrap();

    // Naive read-back races the block cadence: still the old value
    assert_eq!(chain.clock_now().await.unwrap(), 10_000);

    // Only block production commits the change
    BlockProducer::produce_block(&chain).await.unwrap();
    assert_eq!(chain.clock_now().await.unwrap(), 99_000);
}

/// A producer that claims success without committing anything
#[derive(Debug)]
struct StalledProducer {
    chain: MockChain,
}

#[async_trait]
impl BlockProducer for StalledProducer {
    async fn produce_block(&self) -> Result<BlockRef, ConnectionError> {
        Ok(self.chain.head())
    }
}

#[tokio::test]
async fn non_converging_clock_fails_with_timestamp_mismatch() {
    let env = deploy_env(1_000).await;
    let time = TimeController::new(
        Arc::clone(&env.client),
        Arc::new(StalledProducer {
            chain: env.chain.clone(),
        }),
        env.signers.clock_authority().unwrap(),
    );
    let start = env.client.clock_now().await.unwrap();

    let result = time.set_clock(start + 777).await;
    match result {
        Err(TimeControlError::TimestampMismatch {
            requested,
            observed,
        }) => {
            assert_eq!(requested, start + 777);
            assert_eq!(observed, start);
        }
        other => panic!("expected timestamp mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn clock_set_requires_the_designated_authority() {
    let env = deploy_env(1_000).await;
    let impostor = env.recipient();
    let time = TimeController::new(
        Arc::clone(&env.client),
        Arc::new(env.chain.clone()),
        impostor,
    );

    let result = time.set_clock(1).await;
    match result {
        Err(TimeControlError::Connection(ConnectionError::InclusionRejected { reason })) => {
            assert!(reason.contains("authority"))
        }
        other => panic!("expected inclusion rejection, got {other:?}"),
    }
}
