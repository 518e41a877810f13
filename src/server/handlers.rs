//! HTTP handlers

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::application::DispatchResult;
use crate::domain::{
    DiaryEntryContent, Entry, EntryUpdate, NewEntry, NewUser, TimeReference, User, UserUpdate,
};
use crate::infrastructure::EntryFilter;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

// Extractors whose rejections are turned into JSON `ApiError`s
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type PathParam<T> = Result<Path<T>, PathRejection>;
type QueryParams<T> = Result<Query<T>, QueryRejection>;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<usize>,
}

impl ListParams {
    fn into_filter(self) -> ApiResult<EntryFilter> {
        Ok(EntryFilter {
            from: parse_query_date("from", self.from.as_deref())?,
            to: parse_query_date("to", self.to.as_deref())?,
            limit: self.limit,
        })
    }
}

fn parse_query_date(name: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, QUERY_DATE_FORMAT).map_err(|_| {
                ApiError::bad_request(format!(
                    "Invalid '{}' date: '{}'. Expected YYYY-MM-DD",
                    name, v
                ))
            })
        })
        .transpose()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_user(
    State(service): State<AppState>,
    body: JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(user) = body?;
    let created = service.create_user(&user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user(
    State(service): State<AppState>,
    id: PathParam<i64>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(service.get_user(id).await?))
}

pub async fn update_user(
    State(service): State<AppState>,
    id: PathParam<i64>,
    body: JsonBody<UserUpdate>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(update) = body?;
    Ok(Json(service.update_user(id, &update).await?))
}

pub async fn delete_user(
    State(service): State<AppState>,
    id: PathParam<i64>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_entry(
    State(service): State<AppState>,
    user_id: PathParam<i64>,
    body: JsonBody<NewEntry>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let Path(user_id) = user_id?;
    let Json(entry) = body?;
    let created = service.create_entry(user_id, &entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_entries(
    State(service): State<AppState>,
    user_id: PathParam<i64>,
    params: QueryParams<ListParams>,
) -> ApiResult<Json<Vec<Entry>>> {
    let Path(user_id) = user_id?;
    let Query(params) = params?;
    let filter = params.into_filter()?;
    Ok(Json(service.list_entries(user_id, &filter).await?))
}

pub async fn today_entry(
    State(service): State<AppState>,
    user_id: PathParam<i64>,
) -> ApiResult<Json<Entry>> {
    let Path(user_id) = user_id?;
    Ok(Json(service.today_entry(user_id).await?))
}

/// `time_ref` accepts the same forms as the CLI: `yesterday`, `last monday`, `17-01-2025`
pub async fn entry_on(
    State(service): State<AppState>,
    path: PathParam<(i64, String)>,
) -> ApiResult<Json<Entry>> {
    let Path((user_id, time_ref)) = path?;
    let time_ref = TimeReference::parse(&time_ref)?;
    Ok(Json(service.entry_for(user_id, &time_ref).await?))
}

pub async fn get_entry(
    State(service): State<AppState>,
    id: PathParam<i64>,
) -> ApiResult<Json<Entry>> {
    let Path(id) = id?;
    Ok(Json(service.get_entry(id).await?))
}

pub async fn update_entry(
    State(service): State<AppState>,
    id: PathParam<i64>,
    body: JsonBody<EntryUpdate>,
) -> ApiResult<Json<Entry>> {
    let Path(id) = id?;
    let Json(update) = body?;
    Ok(Json(service.update_entry(id, update).await?))
}

pub async fn delete_entry(
    State(service): State<AppState>,
    id: PathParam<i64>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn analyze_entry(
    State(service): State<AppState>,
    id: PathParam<i64>,
) -> ApiResult<Json<DispatchResult>> {
    let Path(id) = id?;
    Ok(Json(service.analyze_entry(id).await?))
}

pub async fn analyze_content(
    State(service): State<AppState>,
    body: JsonBody<DiaryEntryContent>,
) -> ApiResult<Json<DispatchResult>> {
    let Json(content) = body?;
    Ok(Json(service.analyze_content(&content).await?))
}
