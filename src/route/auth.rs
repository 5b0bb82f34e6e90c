use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use tracing::info;

use crate::{
    core::{
        security::{
            generate_refresh_token_from_user, generate_token_from_user,
            get_user_from_refresh_token, verify_hash_password, BearerAuthorization,
        },
        session::{add_session, remove_session},
        utils::datetime_to_string,
    },
    model::user::User,
    repository::user::get_user_by_username,
    route::common::{begin_authorized, internal_error, RequestError},
    schema::{
        auth::{
            LoginRequest, LoginResponse, LoginResponses, LogoutResponses, RefreshTokenRequest,
            RefreshTokenResponses,
        },
        common::{BadRequestResponse, UnauthorizedResponse},
    },
    settings::{get_config, Config},
    AppState,
};

const LOCATION: &str = "route.auth";

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

/// Issue a token pair for `user` and store its session.
async fn issue_tokens<C: redis::ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
) -> Result<LoginResponse, (&'static str, anyhow::Error)> {
    let token = generate_token_from_user(user.clone(), config.clone())
        .await
        .map_err(|err| ("generate token", err))?;
    let refresh_token = generate_refresh_token_from_user(user.clone(), config.clone())
        .await
        .map_err(|err| ("generate refresh token", err))?;
    add_session(redis_conn, user, config, token.clone(), refresh_token.clone())
        .map_err(|err| ("add_session to redis", err))?;

    let now = Local::now().fixed_offset();
    let exp = now + Duration::minutes(config.jwt_exp as i64);
    let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
    Ok(LoginResponse {
        exp: datetime_to_string(exp),
        exp_in: config.jwt_exp as i64 * 60,
        exp_refresh_token: datetime_to_string(exp_refresh_token),
        refresh_token,
        token,
        token_type: "Bearer".to_string(),
    })
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_login",
                    "begin transaction",
                    err,
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_login",
                    "get redis pool connection",
                    err,
                )))
            }
        };

        // inactive users are not found
        let user = match get_user_by_username(&mut tx, &json.user_name).await {
            Ok(Some(val)) => val,
            Ok(None) => {
                return LoginResponses::BadRequest(Json(BadRequestResponse {
                    message: "Invalid credentials".to_string(),
                }))
            }
            Err(err) => {
                return LoginResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_login",
                    "check user on database",
                    err,
                )));
            }
        };

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_login",
                    "validate user password",
                    err,
                )))
            }
        };
        if !is_valid {
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid credentials".to_string(),
            }));
        }

        let config = get_config();
        match issue_tokens(&mut redis_conn, &user, &config).await {
            Ok(val) => {
                info!("user {} logged in", user.user_name);
                LoginResponses::Ok(Json(val))
            }
            Err((step, err)) => LoginResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "auth_login",
                step,
                err,
            ))),
        }
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_refresh_token",
                    "begin transaction",
                    err,
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_refresh_token",
                    "get redis pool connection",
                    err,
                )))
            }
        };

        let config = get_config();
        // an expired or malformed refresh token is rejected, not a server error
        let user = match get_user_from_refresh_token(
            &mut tx,
            Some(json.refresh_token.clone()),
            config.clone(),
        )
        .await
        {
            Ok(Some(val)) => val,
            Ok(None) | Err(_) => {
                return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
        };

        match issue_tokens(&mut redis_conn, &user, &config).await {
            Ok(val) => RefreshTokenResponses::Ok(Json(val)),
            Err((step, err)) => RefreshTokenResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "auth_refresh_token",
                step,
                err,
            ))),
        }
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        let jwt_token = auth.0.token.clone();
        let (_, user) = match begin_authorized(&state, auth, LOCATION, "auth_logout").await {
            Ok(val) => val,
            Err(RequestError::Unauthorized) => {
                return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()))
            }
            Err(RequestError::InternalServerError(err)) => {
                return LogoutResponses::InternalServerError(Json(err))
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_logout",
                    "get redis pool connection",
                    err,
                )))
            }
        };
        if let Some(token) = jwt_token {
            if let Err(err) = remove_session(&mut redis_conn, token) {
                return LogoutResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "auth_logout",
                    "remove session",
                    err,
                )));
            }
        }
        info!("user {} logged out", user.user_name);
        LogoutResponses::NoContent
    }
}
