//! CSV export handler.

use super::ExportQuery;
use crate::api::AppState;
use crate::export::CsvExport;
use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// GET /owners.csv - Download matching owners as CSV
#[utoipa::path(
    get,
    path = "/owners.csv",
    tag = "export",
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment, header row plus one row per owner", content_type = "text/csv", body = String),
        (status = 404, description = "No owners match the filter", body = crate::error::ApiError),
        (status = 413, description = "Too many owners match; refine the filter", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn export_owners_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> crate::Result<CsvExport> {
    let prefix = query.last_name.unwrap_or_default();
    state.export_guard().export(&prefix).await
}

impl IntoResponse for CsvExport {
    fn into_response(self) -> Response {
        let disposition = match HeaderValue::from_str(&self.content_disposition()) {
            Ok(value) => value,
            Err(e) => {
                return crate::Error::Other(format!("invalid export filename: {}", e))
                    .into_response();
            }
        };

        let content_type = HeaderValue::from_static(self.content_type());
        let cache_headers = self.cache_headers();

        let mut response = (StatusCode::OK, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(header::CONTENT_DISPOSITION, disposition);
        for (name, value) in cache_headers {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        response
    }
}
