use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use noteloom_db::models::{NoteRow, format_timestamp};
use noteloom_db::{Database, NoteSearch};
use noteloom_types::api::{ListLinks, NoteForm, NoteListResponse, Pagination, SortOptionInfo};
use noteloom_types::list::ListQuery;
use noteloom_types::{ListState, Note, NoteInput, SortOption};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::middleware::Identity;

/// How many page numbers the pagination links offer at once.
const PAGE_WINDOW: u32 = 5;

/// Render the notes list for `list`. Pure function of the state: callers
/// mutate the `ListState` and call this again.
pub fn render_list(
    db: &Database,
    user_id: Uuid,
    list: &ListState,
    per_page: u32,
) -> Result<NoteListResponse, ApiError> {
    let search = NoteSearch::new(db)
        .for_user(user_id)
        .search(list.search())
        .sort(list.sort());

    let page = search.paginate(per_page, list.page())?;
    let statistics = search.statistics()?;

    let pagination = Pagination {
        current_page: page.current_page,
        last_page: page.last_page(),
        per_page: page.per_page,
        total: page.total,
        from: page.from(),
        to: page.to(),
        has_pages: page.has_pages(),
        pages: page.page_window(PAGE_WINDOW),
    };

    let links = ListLinks {
        current: list.to_query_string(),
        // past the end, step back to the last real page
        prev: (page.current_page > 1).then(|| {
            let prev = (page.current_page - 1).min(page.last_page());
            list.with_page(prev).to_query_string()
        }),
        next: page
            .has_more_pages()
            .then(|| list.with_page(page.current_page + 1).to_query_string()),
    };

    Ok(NoteListResponse {
        notes: page.items,
        pagination,
        statistics,
        sort_options: SortOption::ALL.into_iter().map(SortOptionInfo::from).collect(),
        links,
    })
}

/// Ids that do not parse cannot exist.
fn parse_note_id(id: &str) -> Result<Uuid, ApiError> {
    id.parse().map_err(|_| ApiError::NotFound)
}

/// Load a note the caller owns: missing is 404, someone else's is 403.
fn load_owned(db: &Database, note_id: Uuid, identity: &Identity) -> Result<Note, ApiError> {
    let note = db
        .get_note(&note_id.to_string())?
        .ok_or(ApiError::NotFound)?
        .into_note();

    if note.user_id != identity.user_id {
        return Err(ApiError::Forbidden);
    }
    Ok(note)
}

/// GET /notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let list = ListState::from_query(&query)?;

    let response = blocking(&state, move |s| {
        render_list(&s.db, identity.user_id, &list, s.notes_per_page)
    })
    .await?;

    Ok(Json(response))
}

/// GET /notes/create
pub async fn create_form() -> impl IntoResponse {
    Json(NoteForm::blank())
}

/// POST /notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<NoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let input = input.validated()?;

    let now = format_timestamp(chrono::Utc::now());
    let row = NoteRow {
        id: Uuid::new_v4().to_string(),
        user_id: identity.user_id.to_string(),
        title: input.title,
        content: input.content,
        is_important: input.is_important,
        created_at: now.clone(),
        updated_at: now,
    };

    let note = blocking(&state, move |s| {
        s.db.insert_note(&row)?;
        Ok(row.into_note())
    })
    .await?;

    info!("User {} created note {}", identity.user_id, note.id);
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /notes/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note_id = parse_note_id(&id)?;

    let note = blocking(&state, move |s| load_owned(&s.db, note_id, &identity)).await?;

    Ok(Json(NoteForm::for_note(&note)))
}

/// PUT /notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(input): Json<NoteInput>,
) -> Result<impl IntoResponse, ApiError> {
    let note_id = parse_note_id(&id)?;

    let note = blocking(&state, move |s| {
        let existing = load_owned(&s.db, note_id, &identity)?;
        let input = input.validated()?;
        let updated_at = chrono::Utc::now();

        let updated = s.db.update_note(
            &note_id.to_string(),
            &identity.user_id.to_string(),
            &input.title,
            &input.content,
            input.is_important,
            &format_timestamp(updated_at),
        )?;
        if !updated {
            // deleted between load and update
            return Err(ApiError::NotFound);
        }

        info!("User {} updated note {}", identity.user_id, note_id);
        Ok(Note {
            title: input.title,
            content: input.content,
            is_important: input.is_important,
            updated_at,
            ..existing
        })
    })
    .await?;

    Ok(Json(note))
}

/// DELETE /notes/{id}
///
/// Scoped by owner in a single statement, so another user's note and a
/// missing note are indistinguishable (both 404).
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let note_id = parse_note_id(&id)?;
    let user_id = identity.user_id;

    let deleted = blocking(&state, move |s| {
        Ok(s.db.delete_note(&note_id.to_string(), &user_id.to_string())?)
    })
    .await?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!("User {} deleted note {}", user_id, note_id);
    Ok(StatusCode::NO_CONTENT)
}
