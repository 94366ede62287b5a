//! API request handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gc_policy_admin::AdminError;
use gc_policy_core::{
    build, customize_diff, gc_rules_equivalent, normalize_gc_rules, validate, Configuration,
    FieldChange, MaxAgeField, PendingMaxAgeChange, PolicyNode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Column family addressed by the resource routes
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyPath {
    pub instance: String,
    pub table: String,
    pub family: String,
}

/// Persisted view of a GC policy resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcPolicyResource {
    /// Rendered policy as reported by the store
    pub id: String,
    pub instance_name: String,
    pub table: String,
    pub column_family: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResponse {
    pub policy: PolicyNode,
    pub rendered: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    #[serde(default = "single_block")]
    pub max_age_count: usize,
    #[serde(default)]
    pub days: FieldChange<u32>,
    #[serde(default)]
    pub duration: FieldChange<String>,
}

fn single_block() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub cleared: Vec<MaxAgeField>,
    pub changed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareRulesRequest {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRulesResponse {
    pub equivalent: bool,
    /// Canonical form of `new`, absent when it is not JSON
    pub normalized: Option<String>,
}

/// Strip a self link such as `projects/p/instances/i` down to its last segment
pub fn resource_name_from_self_link(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

// ==================== Policy Handlers ====================

/// Validate and build a configuration without applying it
pub async fn build_policy(
    Json(config): Json<Configuration>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&config)?;
    let policy = build(&config)?;
    let rendered = policy.to_string();
    Ok(Json(BuildResponse { policy, rendered }))
}

/// Run change detection on a pending `max_age` edit
pub async fn plan_max_age(Json(req): Json<PlanRequest>) -> Result<impl IntoResponse, ApiError> {
    let mut diff = PendingMaxAgeChange {
        max_age_count: req.max_age_count,
        days: req.days,
        duration: req.duration,
        cleared: Default::default(),
    };
    customize_diff(&mut diff)?;

    let changed = diff.is_changed();
    if !changed {
        tracing::debug!("max_age change suppressed: {:?}", diff.cleared);
    }
    Ok(Json(PlanResponse {
        cleared: diff.cleared.into_iter().collect(),
        changed,
    }))
}

/// Compare two `gc_rules` documents the way stored state is compared
pub async fn compare_gc_rules(Json(req): Json<CompareRulesRequest>) -> impl IntoResponse {
    Json(CompareRulesResponse {
        equivalent: gc_rules_equivalent(&req.old, &req.new),
        normalized: normalize_gc_rules(&req.new).ok(),
    })
}

// ==================== Resource Handlers ====================

/// Apply a configuration to a column family
pub async fn create_gc_policy(
    State(state): State<Arc<AppState>>,
    Path(target): Path<FamilyPath>,
    Json(config): Json<Configuration>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = resource_name_from_self_link(&target.instance);

    validate(&config)?;
    let policy = build(&config)?;

    state
        .admin
        .set_gc_policy(instance, &target.table, &target.family, &policy)
        .await?;

    let resource = read_resource(&state, instance, &target).await?;
    tracing::info!(
        "Applied GC policy '{}' to {}/{}/{}",
        resource.id,
        instance,
        target.table,
        target.family
    );

    Ok((StatusCode::CREATED, Json(resource)))
}

/// Read the policy currently applied to a column family
pub async fn get_gc_policy(
    State(state): State<Arc<AppState>>,
    Path(target): Path<FamilyPath>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = resource_name_from_self_link(&target.instance);
    let resource = read_resource(&state, instance, &target).await?;
    Ok(Json(resource))
}

/// Reset a column family to collect nothing
pub async fn delete_gc_policy(
    State(state): State<Arc<AppState>>,
    Path(target): Path<FamilyPath>,
) -> Result<impl IntoResponse, ApiError> {
    let instance = resource_name_from_self_link(&target.instance);
    state
        .admin
        .set_gc_policy(instance, &target.table, &target.family, &PolicyNode::NoPolicy)
        .await?;

    tracing::info!(
        "Cleared GC policy of {}/{}/{}",
        instance,
        target.table,
        target.family
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn read_resource(
    state: &AppState,
    instance: &str,
    target: &FamilyPath,
) -> Result<GcPolicyResource, ApiError> {
    let info = match state.admin.table_info(instance, &target.table).await {
        Ok(info) => info,
        Err(AdminError::NotFound(msg)) => {
            tracing::warn!("Removing {} because it's gone: {}", target.table, msg);
            return Err(ApiError::NotFound(msg));
        }
        Err(e) => return Err(e.into()),
    };

    let family = info.family(&target.family).ok_or_else(|| {
        ApiError::NotFound(format!(
            "Column family {} not found in table {}",
            target.family, target.table
        ))
    })?;

    Ok(GcPolicyResource {
        id: family.gc_policy.clone(),
        instance_name: instance.to_string(),
        table: target.table.clone(),
        column_family: target.family.clone(),
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "gc-policy"
    }))
}
