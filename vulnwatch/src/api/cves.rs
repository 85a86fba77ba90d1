use actix_web::web::{self, Json};
use serde::{Deserialize, Serialize};

use catalog_db::db::models::{CveDetail, CveSummary};
use catalog_db::db::query::{ListQuery, Pagination};

use super::{
    error::{handle_blocking_error, internal_server_error, ApplicationError},
    ApplicationContext,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    page: Option<i64>,
    cve_id: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    data: Vec<CveSummary>,
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    result: CveDetail,
}

pub async fn list(
    ctx: web::Data<ApplicationContext>,
    params: web::Query<ListRequest>,
) -> Result<Json<ListResponse>, ApplicationError> {
    let query = ListQuery::new(
        params.page,
        params.cve_id.as_deref(),
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
    );
    let page = query.page();

    let (data, total_count) = web::block(move || {
        ctx.get_repository()
            .list_cves(&query)
            .map_err(internal_server_error)
    })
    .await
    .map_err(handle_blocking_error)??;

    let pagination = Pagination::new(page, total_count);

    Ok(Json(ListResponse { data, pagination }))
}

pub async fn detail(
    ctx: web::Data<ApplicationContext>,
    cve_id: web::Path<String>,
) -> Result<Json<DetailResponse>, ApplicationError> {
    let cve_id = cve_id.trim().to_owned();
    if cve_id.is_empty() {
        // rejected before any store access
        return Err(ApplicationError::BadRequest("CVE ID is required".into()));
    }

    let found = web::block(move || {
        ctx.get_repository()
            .get_cve(&cve_id)
            .map_err(internal_server_error)
    })
    .await
    .map_err(handle_blocking_error)??;

    match found {
        Some(result) => Ok(Json(DetailResponse { result })),
        None => Err(ApplicationError::NotFound("CVE not found".into())),
    }
}
