//! Shared fixtures for resolver integration tests

#![allow(dead_code)]

use keyward_authz::{
    AuthorizationResolver, CommandHandler, InMemoryAggregateStore, OrganizationId, ResolverConfig,
    RoleAggregate, RoleId, UserAggregate, UserId,
};
use std::sync::Arc;

pub const ORG_1: OrganizationId = OrganizationId(1);
pub const ORG_2: OrganizationId = OrganizationId(2);

pub const ROLE_A: RoleId = RoleId(10);
pub const ROLE_B: RoleId = RoleId(20);

pub const ALICE: UserId = UserId(100);

/// Route resolver logs to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyward_authz=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Alice holds role A (org 1, grants "x") and role B (org 2, grants "y")
pub async fn two_org_store() -> Arc<InMemoryAggregateStore> {
    let store = Arc::new(InMemoryAggregateStore::new());
    store
        .insert_role(RoleAggregate::new(ROLE_A, ORG_1, "Role A", "role_a").with_permission("x"))
        .await;
    store
        .insert_role(RoleAggregate::new(ROLE_B, ORG_2, "Role B", "role_b").with_permission("y"))
        .await;
    store
        .insert_user(UserAggregate::new(ALICE).with_role(ROLE_A).with_role(ROLE_B))
        .await;
    store
}

pub fn resolver_for(store: &Arc<InMemoryAggregateStore>) -> Arc<AuthorizationResolver> {
    resolver_with_config(store, ResolverConfig::default())
}

pub fn resolver_with_config(
    store: &Arc<InMemoryAggregateStore>,
    config: ResolverConfig,
) -> Arc<AuthorizationResolver> {
    init_tracing();
    Arc::new(
        AuthorizationResolver::builder(store.clone())
            .projection(store.clone())
            .config(config)
            .build()
            .expect("valid resolver config"),
    )
}

pub fn handler_for(
    store: &Arc<InMemoryAggregateStore>,
    resolver: &Arc<AuthorizationResolver>,
) -> CommandHandler {
    CommandHandler::new(store.clone(), resolver.clone())
}
