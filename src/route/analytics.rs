use std::sync::Arc;

use chrono::NaiveDate;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};

use crate::{
    core::{security::BearerAuthorization, utils::date_to_string},
    model::transaction_item::ItemType,
    repository::analytics::{
        get_daily_series, get_sales_summary, get_staff_performance, get_top_items,
    },
    route::common::{begin_authorized, internal_error, parse_date_param, RequestError},
    schema::{
        analytics::{
            DailySalesPointResponse, DailySeriesResponses, SalesSummaryResponse,
            SalesSummaryResponses, StaffPerformanceResponse, StaffPerformanceResponses,
            TopItemResponse, TopItemResponses,
        },
        common::{BadRequestResponse, UnauthorizedResponse},
    },
    AppState,
};

const LOCATION: &str = "route.analytics";

#[derive(Tags)]
enum ApiAnalyticsTags {
    Analytics,
}

type DateRange = (Option<NaiveDate>, Option<NaiveDate>);

/// Inclusive `start_date`, `end_date`. The `Err` is a message for a 400.
fn parse_date_range(
    start_date: Option<String>,
    end_date: Option<String>,
) -> Result<DateRange, String> {
    let start_date = parse_date_param("start_date", start_date)?;
    let end_date = parse_date_param("end_date", end_date)?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err("start_date must not be after end_date".to_string());
        }
    }
    Ok((start_date, end_date))
}

pub struct ApiAnalytics;

#[OpenApi]
impl ApiAnalytics {
    #[oai(
        path = "/analytics/summary/",
        method = "get",
        tag = "ApiAnalyticsTags::Analytics"
    )]
    async fn sales_summary_api(
        &self,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> SalesSummaryResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "sales_summary_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return SalesSummaryResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return SalesSummaryResponses::InternalServerError(Json(err))
            }
        };

        let (start_date, end_date) = match parse_date_range(start_date, end_date) {
            Ok(val) => val,
            Err(message) => {
                return SalesSummaryResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        match get_sales_summary(&mut tx, start_date, end_date).await {
            Ok(summary) => SalesSummaryResponses::Ok(Json(SalesSummaryResponse {
                start_date: start_date.map(date_to_string),
                end_date: end_date.map(date_to_string),
                total_transactions: summary.total_transactions,
                total_services: summary.total_services,
                total_products: summary.total_products,
                gross_sales: summary.gross_sales,
                net_sales: summary.net_sales,
                total_expenses: summary.total_expenses,
                profit: summary.profit(),
            })),
            Err(err) => SalesSummaryResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "sales_summary_api",
                "get_sales_summary",
                err,
            ))),
        }
    }

    #[oai(
        path = "/analytics/daily/",
        method = "get",
        tag = "ApiAnalyticsTags::Analytics"
    )]
    async fn daily_series_api(
        &self,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> DailySeriesResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "daily_series_api").await
        {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return DailySeriesResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return DailySeriesResponses::InternalServerError(Json(err))
            }
        };

        let (start_date, end_date) = match parse_date_range(start_date, end_date) {
            Ok(val) => val,
            Err(message) => {
                return DailySeriesResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        match get_daily_series(&mut tx, start_date, end_date).await {
            Ok(data) => DailySeriesResponses::Ok(Json(
                data.into_iter()
                    .map(|x| DailySalesPointResponse {
                        sales_date: date_to_string(x.sales_date),
                        total_transactions: x.total_transactions,
                        total_services: x.total_services,
                        total_products: x.total_products,
                        gross_sales: x.gross_sales,
                        net_sales: x.net_sales,
                    })
                    .collect(),
            )),
            Err(err) => DailySeriesResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "daily_series_api",
                "get_daily_series",
                err,
            ))),
        }
    }

    /// Per staff totals with commission from the staff level
    #[oai(
        path = "/analytics/staff/",
        method = "get",
        tag = "ApiAnalyticsTags::Analytics"
    )]
    async fn staff_performance_api(
        &self,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> StaffPerformanceResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "staff_performance_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return StaffPerformanceResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return StaffPerformanceResponses::InternalServerError(Json(err))
                }
            };

        let (start_date, end_date) = match parse_date_range(start_date, end_date) {
            Ok(val) => val,
            Err(message) => {
                return StaffPerformanceResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        match get_staff_performance(&mut tx, start_date, end_date).await {
            Ok(data) => StaffPerformanceResponses::Ok(Json(
                data.into_iter()
                    .map(|x| StaffPerformanceResponse {
                        commission: x.commission(),
                        staff_id: x.staff_id.to_string(),
                        staff_name: x.staff_name,
                        level_name: x.level_name,
                        commission_rate: x.commission_rate,
                        total_transactions: x.total_transactions,
                        total_services: x.total_services,
                        total_products: x.total_products,
                        gross_sales: x.gross_sales,
                        net_sales: x.net_sales,
                    })
                    .collect(),
            )),
            Err(err) => StaffPerformanceResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "staff_performance_api",
                "get_staff_performance",
                err,
            ))),
        }
    }

    /// Best selling items by quantity
    #[oai(
        path = "/analytics/top-items/",
        method = "get",
        tag = "ApiAnalyticsTags::Analytics"
    )]
    async fn top_items_api(
        &self,
        Query(start_date): Query<Option<String>>,
        Query(end_date): Query<Option<String>>,
        Query(item_type): Query<Option<ItemType>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> TopItemResponses {
        let (mut tx, _) = match begin_authorized(&state, auth, LOCATION, "top_items_api").await {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return TopItemResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return TopItemResponses::InternalServerError(Json(err))
            }
        };

        let (start_date, end_date) = match parse_date_range(start_date, end_date) {
            Ok(val) => val,
            Err(message) => {
                return TopItemResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        match get_top_items(&mut tx, start_date, end_date, item_type, limit).await {
            Ok(data) => TopItemResponses::Ok(Json(
                data.into_iter()
                    .map(|x| TopItemResponse {
                        item_type: x.item_type,
                        item_id: x.item_id.map(|x| x.to_string()),
                        item_name: x.item_name,
                        total_quantity: x.total_quantity,
                        total_sales: x.total_sales,
                    })
                    .collect(),
            )),
            Err(err) => TopItemResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "top_items_api",
                "get_top_items",
                err,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range() {
        assert_eq!(parse_date_range(None, None), Ok((None, None)));
        assert_eq!(
            parse_date_range(Some("2025-03-01".to_string()), Some("2025-03-31".to_string())),
            Ok((
                NaiveDate::from_ymd_opt(2025, 3, 1),
                NaiveDate::from_ymd_opt(2025, 3, 31)
            ))
        );
        // single day range
        assert!(
            parse_date_range(Some("2025-03-01".to_string()), Some("2025-03-01".to_string()))
                .is_ok()
        );
        assert!(
            parse_date_range(Some("2025-03-02".to_string()), Some("2025-03-01".to_string()))
                .is_err()
        );
        assert!(parse_date_range(Some("yesterday".to_string()), None).is_err());
    }
}
