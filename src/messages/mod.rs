//! Customer inquiry messages and the admin inbox: read/reply/archive
//! lifecycle with a priority flag. Archived messages stay out of the inbox
//! unless the status filter asks for them.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::order_by;
use crate::shared::error::ApiError;
use crate::shared::schema::messages;
use crate::shared::state::AppState;
use crate::shared::validate::Validator;

pub const STATUSES: &[&str] = &["unread", "read", "replied", "archived"];
pub const PRIORITIES: &[&str] = &["low", "medium", "high"];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = messages)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub content: String,
    pub status: String,
    pub priority: String,
    pub reply_text: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub content: String,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl MessageListQuery {
    fn params(&self) -> ListParams {
        ListParams::from_raw(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.search.as_deref(),
        )
    }
}

const SORT_KEYS: &[&str] = &[
    "name",
    "subject",
    "status",
    "priority",
    "createdAt",
    "updatedAt",
];

fn filtered(q: &MessageListQuery, params: &ListParams) -> messages::BoxedQuery<'static, Pg> {
    let mut query = messages::table.into_boxed();

    match listing::exact(&q.status) {
        Some(value) => query = query.filter(messages::status.eq(value)),
        // The inbox default: archived messages are hidden unless the
        // status filter names them.
        None => query = query.filter(messages::status.ne("archived")),
    }
    if let Some(value) = listing::exact(&q.priority) {
        query = query.filter(messages::priority.eq(value));
    }
    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            messages::name
                .ilike(p.clone())
                .or(messages::email.ilike(p.clone()))
                .or(messages::subject.ilike(p.clone()))
                .or(messages::content.ilike(p)),
        );
    }

    query
}

pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name)
        .require("email", &req.email)
        .email("email", &req.email)
        .require("subject", &req.subject)
        .require("content", &req.content);
    v.finish()?;

    let priority = match req.priority.as_deref() {
        Some(p) if PRIORITIES.contains(&p) => p.to_string(),
        _ => "medium".to_string(),
    };

    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let message = Message {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        subject: req.subject.trim().to_string(),
        content: req.content,
        status: "unread".to_string(),
        priority,
        reply_text: None,
        replied_at: None,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(messages::table)
        .values(&message)
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::new(message)))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MessageListQuery>,
) -> Result<Json<ListResponse<Message>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "name" => order_by!(query, order, messages::name),
        "subject" => order_by!(query, order, messages::subject),
        "status" => order_by!(query, order, messages::status),
        "priority" => order_by!(query, order, messages::priority),
        "updatedAt" => order_by!(query, order, messages::updated_at),
        _ => order_by!(query, order, messages::created_at),
    };

    let rows: Vec<Message> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let mut conn = state.conn.get()?;
    let message: Message = messages::table
        .filter(messages::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Message"))?;
    Ok(Json(ApiResponse::new(message)))
}

pub async fn mark_message_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let mut conn = state.conn.get()?;
    let updated: Option<Message> = diesel::update(
        messages::table
            .filter(messages::id.eq(id))
            .filter(messages::status.eq("unread")),
    )
    .set((
        messages::status.eq("read"),
        messages::updated_at.eq(Utc::now()),
    ))
    .get_result(&mut conn)
    .optional()?;

    // Already read/replied/archived: return the record as-is.
    let message = match updated {
        Some(m) => m,
        None => messages::table
            .filter(messages::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Message"))?,
    };

    Ok(Json(ApiResponse::new(message)))
}

pub async fn reply_to_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let mut v = Validator::new();
    v.require("replyText", &req.reply_text);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let updated: Message = diesel::update(messages::table.filter(messages::id.eq(id)))
        .set((
            messages::status.eq("replied"),
            messages::reply_text.eq(Some(req.reply_text)),
            messages::replied_at.eq(Some(now)),
            messages::updated_at.eq(now),
        ))
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Message"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn archive_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let mut conn = state.conn.get()?;
    let updated: Message = diesel::update(messages::table.filter(messages::id.eq(id)))
        .set((
            messages::status.eq("archived"),
            messages::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Message"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let affected =
        diesel::delete(messages::table.filter(messages::id.eq(id))).execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::not_found("Message"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_message_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages", post(create_message))
        .route("/api/admin/messages", get(list_messages))
        .route(
            "/api/admin/messages/:id",
            get(get_message).delete(delete_message),
        )
        .route("/api/admin/messages/:id/read", put(mark_message_read))
        .route("/api/admin/messages/:id/reply", post(reply_to_message))
        .route("/api/admin/messages/:id/archive", put(archive_message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(status: Option<&str>) -> MessageListQuery {
        MessageListQuery {
            page: None,
            limit: None,
            sort_by: None,
            order: None,
            search: None,
            status: status.map(str::to_string),
            priority: None,
        }
    }

    #[test]
    fn inbox_hides_archived_by_default() {
        let q = query(None);
        let params = q.params();
        let sql = diesel::debug_query::<Pg, _>(&filtered(&q, &params)).to_string();
        assert!(sql.contains("\"status\" != $1"), "{sql}");
        assert!(sql.contains("archived"), "{sql}");
    }

    #[test]
    fn status_filter_overrides_archived_default() {
        let q = query(Some("archived"));
        let params = q.params();
        let sql = diesel::debug_query::<Pg, _>(&filtered(&q, &params)).to_string();
        assert!(sql.contains("\"status\" = $1"), "{sql}");
        assert!(!sql.contains("!="), "{sql}");
    }

    #[test]
    fn unknown_priority_defaults_to_medium() {
        // Mirrors the normalization in create_message.
        let normalize = |raw: Option<&str>| match raw {
            Some(p) if PRIORITIES.contains(&p) => p.to_string(),
            _ => "medium".to_string(),
        };
        assert_eq!(normalize(Some("high")), "high");
        assert_eq!(normalize(Some("urgent")), "medium");
        assert_eq!(normalize(None), "medium");
    }
}
