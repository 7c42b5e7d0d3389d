//! Route definitions for the `/uploads` endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST /videos/sign    presign a resumable video upload
/// POST /pdfs           store a PDF (multipart, field `file`)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/videos/sign", post(uploads::sign_video))
        .route("/pdfs", post(uploads::upload_pdf))
}
