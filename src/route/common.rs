use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        utils::parse_date,
    },
    model::user::User,
    repository::user::get_audit_users,
    schema::common::{DetailUser, InternalServerErrorResponse},
    AppState,
};

pub enum RequestError {
    Unauthorized,
    InternalServerError(InternalServerErrorResponse),
}

/// Begin a db transaction and resolve the user owning the bearer token.
pub async fn begin_authorized(
    state: &AppState,
    auth: BearerAuthorization,
    location: &str,
    function: &str,
) -> Result<(Transaction<'static, Postgres>, User), RequestError> {
    // Begin db transaction
    let mut tx = state.db.begin().await.map_err(|err| {
        RequestError::InternalServerError(InternalServerErrorResponse::new(
            location,
            function,
            "begin transaction",
            &err.to_string(),
        ))
    })?;

    // get redis conn from pool
    let mut redis_conn = state.redis_conn.get().map_err(|err| {
        RequestError::InternalServerError(InternalServerErrorResponse::new(
            location,
            function,
            "get redis pool connection",
            &err.to_string(),
        ))
    })?;

    // Validate user token
    let user = get_user_from_token(&mut tx, &mut redis_conn, auth.0.token)
        .await
        .map_err(|err| {
            RequestError::InternalServerError(InternalServerErrorResponse::new(
                location,
                function,
                "get user from token",
                &err.to_string(),
            ))
        })?;
    match user {
        Some(user) => Ok((tx, user)),
        None => Err(RequestError::Unauthorized),
    }
}

/// `created_by` / `updated_by` of a row as response users.
pub async fn audit_users(
    tx: &mut Transaction<'_, Postgres>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
) -> anyhow::Result<(Option<DetailUser>, Option<DetailUser>)> {
    let (created, updated) = get_audit_users(tx, created_by, updated_by).await?;
    Ok((created.map(DetailUser::from), updated.map(DetailUser::from)))
}

pub fn internal_error(
    location: &str,
    function: &str,
    step: &str,
    err: impl ToString,
) -> InternalServerErrorResponse {
    InternalServerErrorResponse::new(location, function, step, &err.to_string())
}

/// Optional `YYYY-MM-DD` query parameter. The `Err` is a message for a 400.
pub fn parse_date_param(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(value) => match parse_date(&value) {
            Some(date) => Ok(Some(date)),
            None => Err(format!("{} must be a date in YYYY-MM-DD format", name)),
        },
    }
}

/// Optional uuid query parameter. The `Err` is a message for a 400.
pub fn parse_uuid_param(name: &str, value: Option<String>) -> Result<Option<Uuid>, String> {
    match value {
        None => Ok(None),
        Some(value) => match Uuid::parse_str(&value) {
            Ok(id) => Ok(Some(id)),
            Err(_) => Err(format!("{} must be a valid id", name)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert_eq!(parse_date_param("start_date", None), Ok(None));
        assert_eq!(
            parse_date_param("start_date", Some("2025-03-01".to_string())),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 1))
        );
        assert!(parse_date_param("start_date", Some("01-03-2025".to_string())).is_err());
    }

    #[test]
    fn test_parse_uuid_param() {
        let id = Uuid::now_v7();
        assert_eq!(parse_uuid_param("staff_id", None), Ok(None));
        assert_eq!(parse_uuid_param("staff_id", Some(id.to_string())), Ok(Some(id)));
        assert!(parse_uuid_param("staff_id", Some("abc".to_string())).is_err());
    }
}
