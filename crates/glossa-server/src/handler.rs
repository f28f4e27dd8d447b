use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use glossa_sdk::{
    Branch, BranchDiff, BranchId, Conflict, CreateBranch, DiffFingerprint, DiffStats,
    KeyEntry, KeyIdentity, KeyRecord, KeyResolution, MergeRequest, MergeResult, ProjectId,
    Space, SpaceId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ServerResult;
use crate::state::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "glossa-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ---- Spaces ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceBody {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub default_branch_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceResponse {
    #[serde(flatten)]
    pub space: Space,
    pub default_branch: Branch,
}

pub async fn create_space(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSpaceBody>,
) -> ServerResult<(StatusCode, Json<CreateSpaceResponse>)> {
    let user = state.caller(&headers).await?;
    let (space, default_branch) = state
        .run(move |glossa| {
            glossa.create_space(
                &user,
                &body.project_id,
                &body.name,
                body.default_branch_name.as_deref(),
            )
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSpaceResponse {
            space,
            default_branch,
        }),
    ))
}

pub async fn list_branches(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(space_id): Path<SpaceId>,
) -> ServerResult<Json<Vec<Branch>>> {
    let user = state.caller(&headers).await?;
    let branches = state
        .run(move |glossa| glossa.branches(&user, space_id))
        .await?;
    Ok(Json(branches))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchBody {
    pub name: String,
    pub from_branch_id: BranchId,
    #[serde(default)]
    pub slug: Option<String>,
}

pub async fn create_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(space_id): Path<SpaceId>,
    Json(body): Json<CreateBranchBody>,
) -> ServerResult<(StatusCode, Json<Branch>)> {
    let user = state.caller(&headers).await?;
    let request = CreateBranch {
        name: body.name,
        slug: body.slug,
        space_id,
        source_branch_id: body.from_branch_id,
    };
    let branch = state
        .run(move |glossa| glossa.create_branch(&user, request))
        .await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

// ---- Branches ----

pub async fn get_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
) -> ServerResult<Json<Branch>> {
    let user = state.caller(&headers).await?;
    let branch = state.run(move |glossa| glossa.branch(&user, id)).await?;
    Ok(Json(branch))
}

#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub name: String,
}

pub async fn rename_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
    Json(body): Json<RenameBody>,
) -> ServerResult<Json<Branch>> {
    let user = state.caller(&headers).await?;
    let branch = state
        .run(move |glossa| glossa.rename_branch(&user, id, &body.name))
        .await?;
    Ok(Json(branch))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
) -> ServerResult<StatusCode> {
    let user = state.caller(&headers).await?;
    state
        .run(move |glossa| glossa.delete_branch(&user, id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_default_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
) -> ServerResult<Json<Branch>> {
    let user = state.caller(&headers).await?;
    let branch = state
        .run(move |glossa| glossa.set_default_branch(&user, id))
        .await?;
    Ok(Json(branch))
}

pub async fn lineage(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
) -> ServerResult<Json<Vec<Branch>>> {
    let user = state.caller(&headers).await?;
    let chain = state.run(move |glossa| glossa.lineage(&user, id)).await?;
    Ok(Json(chain))
}

// ---- Content ----

pub async fn list_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
) -> ServerResult<Json<Vec<KeyEntry>>> {
    let user = state.caller(&headers).await?;
    let keys = state.run(move |glossa| glossa.keys(&user, id)).await?;
    Ok(Json(keys))
}

#[derive(Debug, Deserialize)]
pub struct SetTranslationBody {
    #[serde(flatten)]
    pub key: KeyIdentity,
    pub language: String,
    pub value: String,
}

pub async fn set_translation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
    Json(body): Json<SetTranslationBody>,
) -> ServerResult<Json<KeyRecord>> {
    let user = state.caller(&headers).await?;
    let key = state
        .run(move |glossa| {
            glossa.set_translation(&user, id, &body.key, &body.language, &body.value)
        })
        .await?;
    Ok(Json(key))
}

// ---- Diff and merge ----

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    #[serde(flatten)]
    pub diff: BranchDiff,
    pub fingerprint: DiffFingerprint,
    pub stats: DiffStats,
}

pub async fn diff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, target_id)): Path<(BranchId, BranchId)>,
) -> ServerResult<Json<DiffResponse>> {
    let user = state.caller(&headers).await?;
    let diff = state
        .run(move |glossa| glossa.diff(&user, id, target_id))
        .await?;
    Ok(Json(DiffResponse {
        fingerprint: diff.fingerprint(),
        stats: diff.stats(),
        diff,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeBody {
    pub target_branch_id: BranchId,
    #[serde(default)]
    pub resolutions: Vec<KeyResolution>,
    #[serde(default)]
    pub expected_fingerprint: Option<DiffFingerprint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<Conflict>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
}

impl From<MergeResult> for MergeResponse {
    fn from(result: MergeResult) -> Self {
        match result {
            MergeResult::Applied(summary) => Self {
                success: true,
                conflicts: None,
                applied_count: Some(summary.applied_count),
                added: Some(summary.added),
                updated: Some(summary.updated),
            },
            MergeResult::Conflicted(conflicts) => Self {
                success: false,
                conflicts: Some(conflicts),
                applied_count: None,
                added: None,
                updated: None,
            },
        }
    }
}

pub async fn merge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<BranchId>,
    Json(body): Json<MergeBody>,
) -> ServerResult<Json<MergeResponse>> {
    let user = state.caller(&headers).await?;
    let request = MergeRequest {
        resolutions: body.resolutions,
        expected_fingerprint: body.expected_fingerprint,
    };
    let target = body.target_branch_id;
    let result = state
        .run(move |glossa| glossa.merge(&user, id, target, &request))
        .await?;
    Ok(Json(result.into()))
}
