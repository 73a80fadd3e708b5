use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use noteloom_db::Database;
use noteloom_db::models::parse_timestamp;
use noteloom_types::ListState;
use noteloom_types::api::{DashboardResponse, DashboardSummary};
use noteloom_types::list::ListQuery;

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::notes::render_list;

pub fn summary(db: &Database, user_id: Uuid) -> Result<DashboardSummary, ApiError> {
    let row = db.note_summary(&user_id.to_string())?;

    let last_updated = row.last_updated.and_then(|value| match parse_timestamp(&value) {
        Ok(at) => Some(at),
        Err(e) => {
            warn!("Corrupt updated_at '{}' for user '{}': {}", value, user_id, e);
            None
        }
    });

    Ok(DashboardSummary {
        total_notes: row.total,
        important_notes: row.important,
        last_updated,
    })
}

/// GET /dashboard: summary counts plus the notes list for the URL state.
pub async fn show(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let list = ListState::from_query(&query)?;

    let response = blocking(&state, move |s| {
        Ok(DashboardResponse {
            summary: summary(&s.db, identity.user_id)?,
            list: render_list(&s.db, identity.user_id, &list, s.notes_per_page)?,
        })
    })
    .await?;

    Ok(Json(response))
}
