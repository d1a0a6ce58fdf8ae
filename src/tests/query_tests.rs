//! Query facade behavior: dry simulation, idempotence, codec failures

use super::helpers::deploy_env;
use crate::connection::ChainClient;
use crate::errors::{CallOutcome, LangError};
use crate::types::{ContractOptions, Id, Timestamp};

#[tokio::test]
async fn query_is_idempotent() {
    let env = deploy_env(1_000).await;
    let owner = env.owner().account_id();
    let query = env.token.query();

    let first = query
        .balance_of(&owner, ContractOptions::default())
        .await
        .unwrap();
    let second = query
        .balance_of(&owner, ContractOptions::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, CallOutcome::Value(1_000));
}

#[tokio::test]
async fn queries_never_broadcast_or_mutate() {
    let env = deploy_env(1_000).await;
    let owner = env.owner().account_id();
    let recipient = env.recipient().account_id();
    let blocks_before = env.chain.block_count();

    // Simulating a mutating method through the raw query facade still
    // leaves state untouched
    let simulated: CallOutcome<()> = env
        .token
        .binding()
        .query()
        .call(
            "transfer",
            &(recipient, 250u128, Vec::<u8>::new()),
            ContractOptions::default(),
        )
        .await
        .unwrap();
    assert!(simulated.is_value());

    let balance = env
        .token
        .query()
        .balance_of(&owner, ContractOptions::default())
        .await
        .unwrap();
    assert_eq!(balance, CallOutcome::Value(1_000));
    assert_eq!(env.chain.block_count(), blocks_before);
}

#[tokio::test]
async fn unknown_method_fails_before_any_round_trip() {
    let env = deploy_env(1_000).await;

    let outcome: CallOutcome<u128> = env
        .token
        .binding()
        .query()
        .call("burn_everything", &(), ContractOptions::default())
        .await
        .unwrap();

    match outcome {
        CallOutcome::Invalid(LangError::Codec(msg)) => assert!(msg.contains("burn_everything")),
        other => panic!("expected codec failure, got {other:?}"),
    }
}

#[tokio::test]
async fn owner_lookup_and_allowance_defaults() {
    let env = deploy_env(1_000).await;
    let owner = env.owner().account_id();
    let operator = env.recipient().account_id();
    let query = env.token.query();

    let token_id = Id::U32(7);
    env.chain.seed_token(&env.token.address(), token_id.clone(), owner);

    let found = query
        .owner_of(&token_id, ContractOptions::default())
        .await
        .unwrap();
    assert_eq!(found, CallOutcome::Value(Some(owner)));

    let missing = query
        .owner_of(&Id::U32(8), ContractOptions::default())
        .await
        .unwrap();
    assert_eq!(missing, CallOutcome::Value(None));

    let granted = query
        .allowance(&owner, &operator, Some(&token_id), ContractOptions::default())
        .await
        .unwrap();
    assert_eq!(granted, CallOutcome::Value(false));
}

#[tokio::test]
async fn collection_id_is_stable_per_instance() {
    let env = deploy_env(1_000).await;
    let query = env.token.query();

    let first = query.collection_id(ContractOptions::default()).await.unwrap();
    let second = query.collection_id(ContractOptions::default()).await.unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, CallOutcome::Value(Id::Bytes(_))));
}

#[tokio::test]
async fn chain_state_surface_answers_clock_and_block_lookups() {
    let env = deploy_env(1_000).await;

    let raw = env
        .client
        .state_query(b"clock")
        .await
        .unwrap()
        .expect("clock key is always populated");
    let clock: Timestamp = bincode::deserialize(&raw).unwrap();
    assert_eq!(clock, env.client.clock_now().await.unwrap());

    // Deploy produced block 1; its hash resolves, unknown heights do not
    assert!(env.client.block_hash(1).await.unwrap().is_some());
    assert_eq!(env.client.block_hash(99).await.unwrap(), None);
}

#[tokio::test]
async fn underfunded_gas_budget_is_an_invocation_failure() {
    let env = deploy_env(1_000).await;
    let owner = env.owner().account_id();

    let outcome = env
        .token
        .query()
        .balance_of(&owner, ContractOptions::default().with_gas_limit(10))
        .await
        .unwrap();

    assert_eq!(outcome, CallOutcome::Invalid(LangError::OutOfGas));
}
