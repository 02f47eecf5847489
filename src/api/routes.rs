use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json, State},
    response::{Html, IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::api::models::{PdfRequest, ScrapeRequest, ScrapeResult};
use crate::api::response;
use crate::pdf::{self, PDF_CONTENT_TYPE, PDF_FILENAME};
use crate::scraper::{extract_paragraphs, fetch_html, normalize_url};
use crate::AppState;

const SCRAPER_PAGE: &str = include_str!("../../static/scraper.html");

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(scraper_page))
        .route("/scraper", get(scraper_page))
        .route("/scrape", post(scrape_handler))
        .route("/generate_pdf", post(generate_pdf_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn scraper_page() -> Html<&'static str> {
    Html(SCRAPER_PAGE)
}

async fn scrape_handler(payload: std::result::Result<Json<ScrapeRequest>, JsonRejection>) -> Response {
    let start_time = std::time::Instant::now();

    let result = match payload {
        Ok(Json(req)) => {
            tracing::info!(data = ?req, "Received scrape request");
            process_scrape_request(req).await
        }
        Err(rejection) => {
            tracing::error!(error = ?rejection, "Unreadable scrape request");
            Err(AppError::UnexpectedError(rejection.body_text()))
        }
    };

    tracing::debug!(elapsed = ?start_time.elapsed(), "Scrape request processed");

    match result {
        Ok(result) => {
            tracing::info!(url = %result.url, paragraphs = result.total_paragraphs, "Scrape succeeded");
            response::success(result).into_response()
        }
        Err(err) => {
            if !matches!(err, AppError::ValidationError(_)) {
                tracing::error!(error = ?err, "Scrape failed");
            }
            err.into_response()
        }
    }
}

async fn process_scrape_request(req: ScrapeRequest) -> Result<ScrapeResult> {
    let url = req
        .url
        .as_deref()
        .and_then(normalize_url)
        .ok_or_else(|| AppError::ValidationError("No URL provided".to_string()))?;

    let html = fetch_html(&url).await?;
    let paragraphs = extract_paragraphs(&html);

    Ok(ScrapeResult::success(url, paragraphs))
}

async fn generate_pdf_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PdfRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::error!(error = ?rejection, "PDF generation error");
            return AppError::RenderError(rejection.body_text()).into_response();
        }
    };

    tracing::info!(
        label = req.label(),
        paragraphs = req.paragraphs().len(),
        "Received PDF request"
    );

    let label = req.label().to_string();
    let paragraphs = req.paragraphs.unwrap_or_default();

    match pdf::render(label, paragraphs, state.config.page_size).await {
        Ok(bytes) => {
            tracing::info!(bytes = bytes.len(), "PDF generated");
            response::attachment(bytes, PDF_FILENAME, PDF_CONTENT_TYPE)
        }
        Err(err) => {
            tracing::error!(error = ?err, "PDF generation error");
            AppError::from(err).into_response()
        }
    }
}
