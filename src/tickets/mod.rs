//! Ticket CRUD, the comment thread endpoint and the reporting views.

pub mod thread;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::middleware::{require_auth, CurrentUser};
use crate::core::shared::errors::{ApiError, ApiResponse};
use crate::core::shared::models::{
    Ticket, TicketCategory, TicketComment, TicketPriority, TicketStatus, User, UserRef, UserRole,
};
use crate::core::shared::schema::{ticket_comments, tickets, users};
use crate::core::shared::state::AppState;
use self::thread::{
    build_thread, effective_parent, notification_target, validate_parent, CommentView,
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub text: Option<String>,
    pub is_internal: Option<bool>,
    pub parent_comment: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub department: Option<String>,
    pub created_by: Option<UserRef>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketView {
    fn new(
        ticket: &Ticket,
        authors: &HashMap<Uuid, User>,
        comments: Vec<CommentView>,
    ) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status.clone(),
            priority: ticket.priority.clone(),
            category: ticket.category.clone(),
            department: ticket.department.clone(),
            created_by: authors.get(&ticket.created_by).map(UserRef::from),
            comments,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_results: i64,
}

#[derive(Debug, Serialize)]
pub struct TicketListData {
    pub tickets: Vec<TicketView>,
    pub pagination: Pagination,
}

/// Validated field set for a ticket update. Workflow fields are dropped (not
/// rejected) for non-staff callers.
#[derive(Debug, Default, PartialEq, AsChangeset)]
#[diesel(table_name = tickets)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
}

pub fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().len() < 5 {
        return Err(ApiError::Validation(
            "Title must be at least 5 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.trim().len() < 10 {
        return Err(ApiError::Validation(
            "Description must be at least 10 characters".into(),
        ));
    }
    Ok(())
}

pub fn permitted_changes(
    req: &UpdateTicketRequest,
    is_staff: bool,
) -> Result<TicketChanges, ApiError> {
    let mut changes = TicketChanges::default();

    if let Some(title) = &req.title {
        validate_title(title)?;
        changes.title = Some(title.trim().to_string());
    }
    if let Some(description) = &req.description {
        validate_description(description)?;
        changes.description = Some(description.trim().to_string());
    }
    if !is_staff {
        return Ok(changes);
    }

    if let Some(status) = &req.status {
        let status = TicketStatus::parse(status)
            .ok_or_else(|| ApiError::Validation("Invalid status value".into()))?;
        changes.status = Some(status.as_str().to_string());
    }
    if let Some(priority) = &req.priority {
        let priority = TicketPriority::parse(priority)
            .ok_or_else(|| ApiError::Validation("Invalid priority value".into()))?;
        changes.priority = Some(priority.as_str().to_string());
    }
    if let Some(category) = &req.category {
        let category = TicketCategory::parse(category)
            .ok_or_else(|| ApiError::Validation("Invalid category value".into()))?;
        changes.category = Some(category.as_str().to_string());
    }
    Ok(changes)
}

pub fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    requested.max(1).min(total_pages.max(1))
}

pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// A ticket is readable by staff and by its creator.
pub fn can_view(ticket: &Ticket, user: &CurrentUser) -> bool {
    user.is_staff() || ticket.created_by == user.id()
}

fn load_authors(
    conn: &mut PgConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, User>, ApiError> {
    let rows: Vec<User> = users::table.filter(users::id.eq_any(ids)).load(conn)?;
    Ok(rows.into_iter().map(|u| (u.id, u)).collect())
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TicketView>>), ApiError> {
    let (Some(title), Some(description), Some(category)) =
        (req.title, req.description, req.category)
    else {
        return Err(ApiError::Validation(
            "Title, description and category are required".into(),
        ));
    };
    validate_title(&title)?;
    validate_description(&description)?;
    let category = TicketCategory::parse(&category)
        .ok_or_else(|| ApiError::Validation("Invalid category value".into()))?;
    let priority = match req.priority {
        Some(p) => TicketPriority::parse(&p)
            .ok_or_else(|| ApiError::Validation("Invalid priority value".into()))?,
        None => TicketPriority::Medium,
    };

    let now = Utc::now();
    let ticket = Ticket {
        id: Uuid::new_v4(),
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        status: TicketStatus::Open.as_str().to_string(),
        priority: priority.as_str().to_string(),
        category: category.as_str().to_string(),
        department: None,
        created_by: user.id(),
        created_at: now,
        updated_at: now,
    };

    let mut conn = state.conn.get()?;
    diesel::insert_into(tickets::table)
        .values(&ticket)
        .execute(&mut conn)?;

    state
        .mailer
        .send_ticket_created(&user.0.email, &user.0.first_name, &ticket);

    let mut authors = HashMap::new();
    authors.insert(user.id(), user.0.clone());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Ticket created successfully",
            TicketView::new(&ticket, &authors, Vec::new()),
        )),
    ))
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<ApiResponse<TicketListData>>, ApiError> {
    let mut conn = state.conn.get()?;

    let scoped = |mut q: tickets::BoxedQuery<'static, diesel::pg::Pg>| {
        match user.role() {
            UserRole::Admin | UserRole::Manager => {}
            UserRole::SupportAgent => {
                if let Some(department) = user.0.assigned_department.clone() {
                    q = q.filter(tickets::department.eq(department));
                }
            }
            UserRole::Customer | UserRole::Vendor => {
                q = q.filter(tickets::created_by.eq(user.id()));
            }
        }
        if let Some(status) = query.status.clone() {
            q = q.filter(tickets::status.eq(status));
        }
        if let Some(priority) = query.priority.clone() {
            q = q.filter(tickets::priority.eq(priority));
        }
        if let Some(category) = query.category.clone() {
            q = q.filter(tickets::category.eq(category));
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search.trim());
            q = q.filter(
                tickets::title
                    .ilike(pattern.clone())
                    .or(tickets::description.ilike(pattern)),
            );
        }
        q
    };

    let total_results: i64 = scoped(tickets::table.into_boxed())
        .count()
        .get_result(&mut conn)?;

    let limit = clamp_limit(query.limit);
    let total_pages = (total_results + limit - 1) / limit;
    let page = clamp_page(query.page.unwrap_or(1), total_pages);

    let rows: Vec<Ticket> = scoped(tickets::table.into_boxed())
        .order(tickets::created_at.desc())
        .offset((page - 1) * limit)
        .limit(limit)
        .load(&mut conn)?;

    let ticket_ids: Vec<Uuid> = rows.iter().map(|t| t.id).collect();
    let comments: Vec<TicketComment> = ticket_comments::table
        .filter(ticket_comments::ticket_id.eq_any(&ticket_ids))
        .load(&mut conn)?;

    let mut author_ids: Vec<Uuid> = rows.iter().map(|t| t.created_by).collect();
    author_ids.extend(comments.iter().map(|c| c.author_id));
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors = load_authors(&mut conn, author_ids)?;

    let mut by_ticket: HashMap<Uuid, Vec<TicketComment>> = HashMap::new();
    for comment in comments {
        by_ticket.entry(comment.ticket_id).or_default().push(comment);
    }

    let viewer_is_staff = user.is_staff();
    let views = rows
        .iter()
        .map(|ticket| {
            let ticket_comments = by_ticket.remove(&ticket.id).unwrap_or_default();
            let thread = build_thread(&ticket_comments, &authors, viewer_is_staff);
            TicketView::new(ticket, &authors, thread)
        })
        .collect();

    Ok(Json(ApiResponse::new(TicketListData {
        tickets: views,
        pagination: Pagination {
            page,
            limit,
            total_pages,
            total_results,
        },
    })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: i64,
    pub by_status: HashMap<String, i64>,
    pub by_priority: HashMap<String, i64>,
    pub by_category: HashMap<String, i64>,
    pub created_last_week: Vec<DailyCount>,
}

pub fn aggregate_stats(
    rows: &[(String, String, String, DateTime<Utc>)],
    now: DateTime<Utc>,
) -> TicketStats {
    let mut by_status = HashMap::new();
    let mut by_priority = HashMap::new();
    let mut by_category = HashMap::new();
    for (status, priority, category, _) in rows {
        *by_status.entry(status.clone()).or_insert(0) += 1;
        *by_priority.entry(priority.clone()).or_insert(0) += 1;
        *by_category.entry(category.clone()).or_insert(0) += 1;
    }

    let created_last_week = (0..7)
        .rev()
        .map(|days_ago| {
            let date = (now - Duration::days(days_ago)).date_naive();
            let count = rows
                .iter()
                .filter(|(_, _, _, created)| created.date_naive() == date)
                .count() as i64;
            DailyCount { date, count }
        })
        .collect();

    TicketStats {
        total: rows.len() as i64,
        by_status,
        by_priority,
        by_category,
        created_last_week,
    }
}

pub async fn ticket_stats(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<TicketStats>>, ApiError> {
    user.require_any_role(&[UserRole::Admin, UserRole::Manager])?;

    let mut conn = state.conn.get()?;
    let rows: Vec<(String, String, String, DateTime<Utc>)> = tickets::table
        .select((
            tickets::status,
            tickets::priority,
            tickets::category,
            tickets::created_at,
        ))
        .load(&mut conn)?;

    Ok(Json(ApiResponse::new(aggregate_stats(&rows, Utc::now()))))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub user: UserRef,
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub closed: i64,
}

pub async fn active_users(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<ActiveUser>>>, ApiError> {
    user.require_any_role(&[UserRole::Admin, UserRole::Manager])?;

    let mut conn = state.conn.get()?;
    let rows: Vec<(Uuid, String)> = tickets::table
        .select((tickets::created_by, tickets::status))
        .load(&mut conn)?;

    #[derive(Default)]
    struct Counts {
        total: i64,
        open: i64,
        in_progress: i64,
        closed: i64,
    }
    let mut per_user: HashMap<Uuid, Counts> = HashMap::new();
    for (creator, status) in rows {
        let counts = per_user.entry(creator).or_default();
        counts.total += 1;
        match TicketStatus::parse(&status) {
            Some(TicketStatus::Open) => counts.open += 1,
            Some(TicketStatus::InProgress) => counts.in_progress += 1,
            Some(TicketStatus::Closed) => counts.closed += 1,
            None => {}
        }
    }

    let mut ranked: Vec<(Uuid, Counts)> = per_user.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total));
    ranked.truncate(10);

    let authors = load_authors(&mut conn, ranked.iter().map(|(id, _)| *id).collect())?;
    let top = ranked
        .into_iter()
        .filter_map(|(id, counts)| {
            authors.get(&id).map(|u| ActiveUser {
                user: UserRef::from(u),
                total: counts.total,
                open: counts.open,
                in_progress: counts.in_progress,
                closed: counts.closed,
            })
        })
        .collect();

    Ok(Json(ApiResponse::new(top)))
}

fn load_ticket(conn: &mut PgConnection, id: Uuid) -> Result<Ticket, ApiError> {
    let ticket: Option<Ticket> = tickets::table
        .filter(tickets::id.eq(id))
        .first(conn)
        .optional()?;
    ticket.ok_or_else(|| ApiError::NotFound("Ticket not found".into()))
}

pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketView>>, ApiError> {
    let mut conn = state.conn.get()?;
    let ticket = load_ticket(&mut conn, id)?;
    if !can_view(&ticket, &user) {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }

    let comments: Vec<TicketComment> = ticket_comments::table
        .filter(ticket_comments::ticket_id.eq(ticket.id))
        .load(&mut conn)?;

    let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    author_ids.push(ticket.created_by);
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors = load_authors(&mut conn, author_ids)?;

    let thread = build_thread(&comments, &authors, user.is_staff());
    Ok(Json(ApiResponse::new(TicketView::new(
        &ticket, &authors, thread,
    ))))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<ApiResponse<TicketView>>, ApiError> {
    let mut conn = state.conn.get()?;
    let ticket = load_ticket(&mut conn, id)?;
    if !user.is_staff() && ticket.created_by != user.id() {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }

    let changes = permitted_changes(&req, user.is_staff())?;
    if changes != TicketChanges::default() {
        diesel::update(tickets::table.filter(tickets::id.eq(id)))
            .set((&changes, tickets::updated_at.eq(Utc::now())))
            .execute(&mut conn)?;
    }

    let updated = load_ticket(&mut conn, id)?;
    let authors = load_authors(&mut conn, vec![updated.created_by])?;
    Ok(Json(ApiResponse::with_message(
        "Ticket updated successfully",
        TicketView::new(&updated, &authors, Vec::new()),
    )))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let ticket = load_ticket(&mut conn, id)?;
    if user.role() != UserRole::Admin && ticket.created_by != user.id() {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(
            ticket_comments::table.filter(ticket_comments::ticket_id.eq(ticket.id)),
        )
        .execute(conn)?;
        diesel::delete(tickets::table.filter(tickets::id.eq(ticket.id))).execute(conn)?;
        Ok(())
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentView>>), ApiError> {
    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("Comment text is required".into()))?;

    let mut conn = state.conn.get()?;
    let ticket = load_ticket(&mut conn, id)?;
    if !can_view(&ticket, &user) {
        return Err(ApiError::Forbidden(
            "You are not allowed to perform this action".into(),
        ));
    }

    let parent: Option<TicketComment> = match req.parent_comment {
        Some(parent_id) => {
            let found: Option<TicketComment> = ticket_comments::table
                .filter(ticket_comments::id.eq(parent_id))
                .first(&mut conn)
                .optional()?;
            let found =
                found.ok_or_else(|| ApiError::NotFound("Parent comment not found".into()))?;
            validate_parent(&found, ticket.id)?;
            Some(found)
        }
        None => None,
    };

    let comment = TicketComment {
        id: Uuid::new_v4(),
        ticket_id: ticket.id,
        author_id: user.id(),
        body: text.to_string(),
        is_internal: req.is_internal.unwrap_or(false) && user.is_staff(),
        parent_id: parent.as_ref().map(effective_parent),
        created_at: Utc::now(),
    };

    diesel::insert_into(ticket_comments::table)
        .values(&comment)
        .execute(&mut conn)?;

    let parent_author = parent.as_ref().map(|p| p.author_id);
    if let Some(target) = notification_target(&comment, parent_author, ticket.created_by) {
        let recipient: Option<User> = users::table
            .filter(users::id.eq(target))
            .first(&mut conn)
            .optional()?;
        if let Some(recipient) = recipient {
            state.mailer.send_comment_notification(
                &recipient.email,
                &recipient.first_name,
                ticket.id,
                &ticket.title,
                &user.0.full_name(),
                &comment.body,
                parent_author.is_some(),
            );
        }
    }

    let mut authors = HashMap::new();
    authors.insert(user.id(), user.0.clone());
    let view = CommentView {
        id: comment.id,
        ticket: comment.ticket_id,
        author: authors.get(&comment.author_id).map(UserRef::from),
        text: comment.body.clone(),
        is_internal: comment.is_internal,
        parent_comment: comment.parent_id,
        created_at: comment.created_at,
        replies: Vec::new(),
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Comment added successfully", view)),
    ))
}

pub fn configure_ticket_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_ticket).get(list_tickets))
        .route("/stats", get(ticket_stats))
        .route("/active-users", get(active_users))
        .route(
            "/:id",
            get(get_ticket).patch(update_ticket).delete(delete_ticket),
        )
        .route("/:id/comments", post(create_comment))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(
        title: Option<&str>,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> UpdateTicketRequest {
        UpdateTicketRequest {
            title: title.map(String::from),
            description: None,
            status: status.map(String::from),
            priority: priority.map(String::from),
            category: None,
        }
    }

    #[test]
    fn non_staff_updates_drop_workflow_fields() {
        let req = update(Some("Broken login"), Some("Closed"), Some("High"));
        let changes = permitted_changes(&req, false).unwrap();
        assert_eq!(changes.title.as_deref(), Some("Broken login"));
        assert!(changes.status.is_none());
        assert!(changes.priority.is_none());
    }

    #[test]
    fn staff_updates_apply_workflow_fields() {
        let req = update(None, Some("In Progress"), Some("High"));
        let changes = permitted_changes(&req, true).unwrap();
        assert_eq!(changes.status.as_deref(), Some("In Progress"));
        assert_eq!(changes.priority.as_deref(), Some("High"));
    }

    #[test]
    fn invalid_enum_values_rejected_for_staff() {
        let req = update(None, Some("Reopened"), None);
        assert!(permitted_changes(&req, true).is_err());

        let req = update(None, None, Some("Urgent"));
        assert!(permitted_changes(&req, true).is_err());
    }

    #[test]
    fn short_title_and_description_rejected() {
        let req = update(Some("Hi"), None, None);
        assert!(permitted_changes(&req, false).is_err());

        let req = UpdateTicketRequest {
            description: Some("long enough description".into()),
            ..Default::default()
        };
        assert!(permitted_changes(&req, false).is_ok());

        let req = UpdateTicketRequest {
            description: Some("short".into()),
            ..Default::default()
        };
        assert!(permitted_changes(&req, false).is_err());
    }

    #[test]
    fn page_clamped_into_range() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(-3, 5), 1);
        assert_eq!(clamp_page(3, 5), 3);
        assert_eq!(clamp_page(9, 5), 5);
        // No results still serves page 1.
        assert_eq!(clamp_page(4, 0), 1);
    }

    #[test]
    fn limit_clamped_with_default() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 100);
        assert_eq!(clamp_limit(Some(25)), 25);
    }

    #[test]
    fn stats_count_by_dimension_and_day() {
        let now = Utc::now();
        let rows = vec![
            ("Open".into(), "High".into(), "Technical".into(), now),
            ("Open".into(), "Low".into(), "Billing".into(), now),
            (
                "Closed".into(),
                "High".into(),
                "Technical".into(),
                now - Duration::days(2),
            ),
            (
                "Closed".into(),
                "Medium".into(),
                "General".into(),
                now - Duration::days(30),
            ),
        ];

        let stats = aggregate_stats(&rows, now);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status["Open"], 2);
        assert_eq!(stats.by_status["Closed"], 2);
        assert_eq!(stats.by_priority["High"], 2);
        assert_eq!(stats.by_category["Technical"], 2);

        assert_eq!(stats.created_last_week.len(), 7);
        assert_eq!(stats.created_last_week[6].count, 2);
        assert_eq!(stats.created_last_week[4].count, 1);
        let week_total: i64 = stats.created_last_week.iter().map(|d| d.count).sum();
        assert_eq!(week_total, 3);
    }
}
