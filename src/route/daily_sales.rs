use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};

use crate::{
    core::{
        security::BearerAuthorization,
        utils::{date_to_string, datetime_to_string_opt},
    },
    model::daily_sales::DailySales,
    repository::{daily_sales::paginate_daily_sales, staff::get_staff_by_id},
    route::common::{
        begin_authorized, internal_error, parse_date_param, parse_uuid_param, RequestError,
    },
    schema::{
        common::{BadRequestResponse, PaginateResponse, UnauthorizedResponse},
        daily_sales::{DailySalesDetail, PaginateDailySalesResponses},
    },
    AppState,
};

const LOCATION: &str = "route.daily_sales";

#[derive(Tags)]
enum ApiDailySalesTags {
    DailySales,
}

pub async fn daily_sales_detail(
    tx: &mut Transaction<'_, Postgres>,
    daily_sales: DailySales,
) -> anyhow::Result<DailySalesDetail> {
    let staff = get_staff_by_id(tx, &daily_sales.staff_id).await?;
    Ok(DailySalesDetail {
        id: daily_sales.id.to_string(),
        sales_date: date_to_string(daily_sales.sales_date),
        staff_id: daily_sales.staff_id.to_string(),
        staff_name: staff.map(|x| x.staff_name),
        total_transactions: daily_sales.total_transactions,
        total_services: daily_sales.total_services,
        total_products: daily_sales.total_products,
        gross_sales: daily_sales.gross_sales,
        net_sales: daily_sales.net_sales,
        updated_date: datetime_to_string_opt(daily_sales.updated_date),
    })
}

pub struct ApiDailySales;

#[OpenApi]
impl ApiDailySales {
    /// Per staff, per day aggregates. Newest day first.
    #[oai(
        path = "/daily-sales/",
        method = "get",
        tag = "ApiDailySalesTags::DailySales"
    )]
    async fn paginate_daily_sales_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(staff_id): Query<Option<String>>,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateDailySalesResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_daily_sales_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateDailySalesResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateDailySalesResponses::InternalServerError(Json(err))
                }
            };

        let filters = parse_uuid_param("staff_id", staff_id).and_then(|staff_id| {
            Ok((
                staff_id,
                parse_date_param("start_date", start_date)?,
                parse_date_param("end_date", end_date)?,
            ))
        });
        let (staff_id, start_date, end_date) = match filters {
            Ok(val) => val,
            Err(message) => {
                return PaginateDailySalesResponses::BadRequest(Json(BadRequestResponse {
                    message,
                }))
            }
        };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) = match paginate_daily_sales(
            &mut tx, page, page_size, staff_id, start_date, end_date,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return PaginateDailySalesResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "paginate_daily_sales_api",
                    "paginate_daily_sales",
                    err,
                )))
            }
        };

        let mut results: Vec<DailySalesDetail> = vec![];
        for item in data {
            match daily_sales_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateDailySalesResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_daily_sales_api",
                        "daily_sales_detail",
                        err,
                    )))
                }
            }
        }

        PaginateDailySalesResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }
}
