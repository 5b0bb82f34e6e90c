use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{security::BearerAuthorization, utils::datetime_to_string_opt},
    model::product::Product,
    repository::product::{
        adjust_product_stock, create_product, get_dropdown_product, get_product_by_id,
        paginate_product, soft_delete_product, update_product,
    },
    route::common::{audit_users, begin_authorized, internal_error, RequestError},
    schema::{
        common::{BadRequestResponse, NotFoundResponse, PaginateResponse, UnauthorizedResponse},
        product::{
            PaginateProductResponses, ProductCreateRequest, ProductCreateResponses,
            ProductDeleteResponses, ProductDetail, ProductDetailResponses, ProductDropdownResponse,
            ProductDropdownResponses, ProductStockRequest, ProductStockResponses,
            ProductUpdateRequest, ProductUpdateResponses,
        },
    },
    AppState,
};

const LOCATION: &str = "route.product";

#[derive(Tags)]
enum ApiProductTags {
    Product,
}

async fn product_detail(
    tx: &mut Transaction<'_, Postgres>,
    product: Product,
) -> anyhow::Result<ProductDetail> {
    let (created_by, updated_by) = audit_users(tx, product.created_by, product.updated_by).await?;
    Ok(ProductDetail {
        id: product.id.to_string(),
        product_name: product.product_name,
        description: product.description,
        category: product.category,
        price: product.price,
        stock: product.stock,
        is_active: product.is_active,
        created_by,
        updated_by,
        created_date: datetime_to_string_opt(product.created_date),
        updated_date: datetime_to_string_opt(product.updated_date),
    })
}

/// Trimmed product name, or a message for a 400.
fn validate_product_fields(product_name: &str, price: i64) -> Result<String, String> {
    let product_name = product_name.trim().to_string();
    if product_name.is_empty() {
        return Err("product_name is required".to_string());
    }
    if price < 0 {
        return Err("price cannot be negative".to_string());
    }
    Ok(product_name)
}

fn product_not_found(id: &str) -> Json<NotFoundResponse> {
    Json(NotFoundResponse {
        message: format!("product with id = {} not found", id),
    })
}

pub struct ApiProduct;

#[OpenApi]
impl ApiProduct {
    #[oai(path = "/product/", method = "get", tag = "ApiProductTags::Product")]
    async fn paginate_product_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(category): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateProductResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "paginate_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return PaginateProductResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return PaginateProductResponses::InternalServerError(Json(err))
                }
            };

        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(10);
        let (data, counts, page_count) =
            match paginate_product(&mut tx, page, page_size, search, category).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateProductResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_product_api",
                        "paginate_product",
                        err,
                    )))
                }
            };

        let mut results: Vec<ProductDetail> = vec![];
        for item in data {
            match product_detail(&mut tx, item).await {
                Ok(val) => results.push(val),
                Err(err) => {
                    return PaginateProductResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "paginate_product_api",
                        "product_detail",
                        err,
                    )))
                }
            }
        }

        PaginateProductResponses::Ok(Json(PaginateResponse {
            counts,
            page: page.max(1),
            page_count,
            page_size,
            results,
        }))
    }

    #[oai(path = "/product/dropdown/", method = "get", tag = "ApiProductTags::Product")]
    async fn dropdown_product_api(
        &self,
        Query(limit): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductDropdownResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "dropdown_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductDropdownResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductDropdownResponses::InternalServerError(Json(err))
                }
            };

        let data = match get_dropdown_product(&mut tx, limit, search).await {
            Ok(val) => val,
            Err(err) => {
                return ProductDropdownResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "dropdown_product_api",
                    "get_dropdown_product",
                    err,
                )))
            }
        };
        ProductDropdownResponses::Ok(Json(
            data.into_iter()
                .map(|x| ProductDropdownResponse {
                    id: x.id.to_string(),
                    product_name: x.product_name,
                    price: x.price,
                    stock: x.stock,
                })
                .collect(),
        ))
    }

    #[oai(path = "/product/detail/", method = "get", tag = "ApiProductTags::Product")]
    async fn detail_product_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductDetailResponses {
        let (mut tx, _) =
            match begin_authorized(&state, auth, LOCATION, "detail_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductDetailResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductDetailResponses::InternalServerError(Json(err))
                }
            };

        let Ok(product_id) = Uuid::parse_str(&id) else {
            return ProductDetailResponses::NotFound(product_not_found(&id));
        };
        let product = match get_product_by_id(&mut tx, &product_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ProductDetailResponses::NotFound(product_not_found(&id)),
            Err(err) => {
                return ProductDetailResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "detail_product_api",
                    "get_product_by_id",
                    err,
                )))
            }
        };
        match product_detail(&mut tx, product).await {
            Ok(val) => ProductDetailResponses::Ok(Json(val)),
            Err(err) => ProductDetailResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "detail_product_api",
                "product_detail",
                err,
            ))),
        }
    }

    #[oai(path = "/product/", method = "post", tag = "ApiProductTags::Product")]
    async fn create_product_api(
        &self,
        Json(json): Json<ProductCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductCreateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "create_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductCreateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductCreateResponses::InternalServerError(Json(err))
                }
            };

        let product_name = match validate_product_fields(&json.product_name, json.price) {
            Ok(val) => val,
            Err(message) => {
                return ProductCreateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        let stock = json.stock.unwrap_or(0);
        if stock < 0 {
            return ProductCreateResponses::BadRequest(Json(BadRequestResponse {
                message: "stock cannot be negative".to_string(),
            }));
        }
        let now = Local::now().fixed_offset();
        let product = Product {
            id: Uuid::now_v7(),
            product_name,
            description: json.description,
            category: json.category,
            price: json.price,
            stock,
            is_active: true,
            created_by: Some(request_user.id),
            updated_by: Some(request_user.id),
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_product(&mut tx, &product).await {
            return ProductCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_product_api",
                "create_product",
                err,
            )));
        }
        let detail = match product_detail(&mut tx, product).await {
            Ok(val) => val,
            Err(err) => {
                return ProductCreateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "create_product_api",
                    "product_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return ProductCreateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "create_product_api",
                "commit transaction",
                err,
            )));
        }
        ProductCreateResponses::Ok(Json(detail))
    }

    #[oai(path = "/product/", method = "put", tag = "ApiProductTags::Product")]
    async fn update_product_api(
        &self,
        Query(id): Query<String>,
        Json(json): Json<ProductUpdateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductUpdateResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "update_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductUpdateResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductUpdateResponses::InternalServerError(Json(err))
                }
            };

        let Ok(product_id) = Uuid::parse_str(&id) else {
            return ProductUpdateResponses::NotFound(product_not_found(&id));
        };
        let mut product = match get_product_by_id(&mut tx, &product_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ProductUpdateResponses::NotFound(product_not_found(&id)),
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_product_api",
                    "get_product_by_id",
                    err,
                )))
            }
        };
        let product_name = match validate_product_fields(&json.product_name, json.price) {
            Ok(val) => val,
            Err(message) => {
                return ProductUpdateResponses::BadRequest(Json(BadRequestResponse { message }))
            }
        };
        product.product_name = product_name;
        product.description = json.description;
        product.category = json.category;
        product.price = json.price;

        let now = Local::now().fixed_offset();
        if let Err(err) = update_product(&mut tx, &mut product, &request_user, &now).await {
            return ProductUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_product_api",
                "update_product",
                err,
            )));
        }
        let detail = match product_detail(&mut tx, product).await {
            Ok(val) => val,
            Err(err) => {
                return ProductUpdateResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "update_product_api",
                    "product_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return ProductUpdateResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "update_product_api",
                "commit transaction",
                err,
            )));
        }
        ProductUpdateResponses::Ok(Json(detail))
    }

    #[oai(path = "/product/", method = "delete", tag = "ApiProductTags::Product")]
    async fn delete_product_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductDeleteResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "delete_product_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductDeleteResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductDeleteResponses::InternalServerError(Json(err))
                }
            };

        let Ok(product_id) = Uuid::parse_str(&id) else {
            return ProductDeleteResponses::NotFound(product_not_found(&id));
        };
        let mut product = match get_product_by_id(&mut tx, &product_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ProductDeleteResponses::NotFound(product_not_found(&id)),
            Err(err) => {
                return ProductDeleteResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "delete_product_api",
                    "get_product_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        if let Err(err) = soft_delete_product(&mut tx, &mut product, &request_user, &now).await {
            return ProductDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_product_api",
                "soft_delete_product",
                err,
            )));
        }
        if let Err(err) = tx.commit().await {
            return ProductDeleteResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "delete_product_api",
                "commit transaction",
                err,
            )));
        }
        ProductDeleteResponses::NoContent
    }

    /// Adjust stock by a signed delta
    #[oai(path = "/product/stock/", method = "post", tag = "ApiProductTags::Product")]
    async fn adjust_product_stock_api(
        &self,
        Json(json): Json<ProductStockRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ProductStockResponses {
        let (mut tx, request_user) =
            match begin_authorized(&state, auth, LOCATION, "adjust_product_stock_api").await {
                Ok(val) => val,
                Err(RequestError::Unauthorized) => {
                    return ProductStockResponses::Unauthorized(Json(
                        UnauthorizedResponse::default(),
                    ))
                }
                Err(RequestError::InternalServerError(err)) => {
                    return ProductStockResponses::InternalServerError(Json(err))
                }
            };

        let id = json.product_id;
        let Ok(product_id) = Uuid::parse_str(&id) else {
            return ProductStockResponses::NotFound(product_not_found(&id));
        };
        let product = match get_product_by_id(&mut tx, &product_id).await {
            Ok(Some(val)) => val,
            Ok(None) => return ProductStockResponses::NotFound(product_not_found(&id)),
            Err(err) => {
                return ProductStockResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "adjust_product_stock_api",
                    "get_product_by_id",
                    err,
                )))
            }
        };
        let now = Local::now().fixed_offset();
        let adjusted =
            adjust_product_stock(&mut tx, &product.id, json.delta, &request_user, &now).await;
        let product = match adjusted {
            Ok(Some(val)) => val,
            Ok(None) => {
                return ProductStockResponses::BadRequest(Json(BadRequestResponse {
                    message: format!(
                        "stock of {} cannot go below zero (current {})",
                        product.product_name, product.stock
                    ),
                }))
            }
            Err(err) => {
                return ProductStockResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "adjust_product_stock_api",
                    "adjust_product_stock",
                    err,
                )))
            }
        };
        let detail = match product_detail(&mut tx, product).await {
            Ok(val) => val,
            Err(err) => {
                return ProductStockResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "adjust_product_stock_api",
                    "product_detail",
                    err,
                )))
            }
        };
        if let Err(err) = tx.commit().await {
            return ProductStockResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "adjust_product_stock_api",
                "commit transaction",
                err,
            )));
        }
        ProductStockResponses::Ok(Json(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_fields() {
        assert_eq!(
            validate_product_fields(" Pomade ", 45000),
            Ok("Pomade".to_string())
        );
        assert_eq!(validate_product_fields("Pomade", 0), Ok("Pomade".to_string()));
        assert!(validate_product_fields("", 45000).is_err());
        assert!(validate_product_fields("Pomade", -1).is_err());
    }
}
