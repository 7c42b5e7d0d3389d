pub mod course;
pub mod health;
pub mod lesson;
pub mod section;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /courses                                         list, create
/// /courses/{id}                                    get, update, delete
/// /courses/{course_id}/tree                        full nested hierarchy (?published_only)
/// /courses/{course_id}/sales                       sales page payload
///
/// /courses/{course_id}/sections                    list, create (appends)
/// /courses/{course_id}/sections/reorder            reorder siblings (PUT)
/// /courses/{course_id}/sections/{id}               get, update, delete
///
/// /courses/{course_id}/plans                       list, create
/// /courses/{course_id}/plans/{id}                  get, update, delete
///
/// /sections/{section_id}/lessons                   list, create (appends)
/// /sections/{section_id}/lessons/reorder           reorder siblings (PUT)
/// /sections/{section_id}/lessons/{id}              get, update, delete
///
/// /lessons/{lesson_id}/blocks                      list, create (appends)
/// /lessons/{lesson_id}/blocks/reorder              reorder siblings (PUT)
/// /lessons/{lesson_id}/blocks/{id}                 get, update, delete
///
/// /uploads/videos/sign                             presign a video upload (POST)
/// /uploads/pdfs                                    store a PDF (POST, multipart)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Course routes (also nests sections, plans, tree, sales).
        .nest("/courses", course::router())
        // Section-scoped lessons.
        .nest("/sections", section::router())
        // Lesson-scoped content blocks.
        .nest("/lessons", lesson::router())
        // Upload endpoints (video presign, PDF storage).
        .nest("/uploads", uploads::router())
}
