use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use poem::web::Data;
use poem_openapi::{param::Header, payload::Json, OpenApi, Tags};
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    core::security::unusable_password_hash,
    model::user::User,
    repository::user::{
        create_user, get_user_by_external_id, is_user_name_taken, soft_delete_user, update_user,
    },
    route::common::internal_error,
    schema::{
        common::{BadRequestResponse, UnauthorizedResponse},
        webhook::{WebhookResponse, WebhookResponses, WebhookUserData, WebhookUserEvent},
    },
    settings::get_config,
    AppState,
};

const LOCATION: &str = "route.webhook";

#[derive(Tags)]
enum ApiWebhookTags {
    Webhook,
}

#[derive(Debug, PartialEq)]
enum UserEvent {
    Upsert,
    Deactivate,
}

impl UserEvent {
    fn parse(event_type: &str) -> Option<Self> {
        match event_type {
            "user.created" | "user.updated" => Some(UserEvent::Upsert),
            "user.deleted" => Some(UserEvent::Deactivate),
            _ => None,
        }
    }
}

/// Username, else the local part of the primary email, else the external id.
fn provisioned_user_name(data: &WebhookUserData) -> String {
    data.username
        .as_ref()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .or_else(|| {
            data.primary_email()
                .and_then(|x| x.split('@').next().map(|x| x.to_string()))
                .filter(|x| !x.is_empty())
        })
        .unwrap_or_else(|| data.id.clone())
}

async fn upsert_provisioned_user(
    tx: &mut Transaction<'_, Postgres>,
    data: &WebhookUserData,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<User> {
    let existing = get_user_by_external_id(tx, &data.id).await?;
    let exclude_id = existing.as_ref().map(|x| x.id);
    let mut user_name = provisioned_user_name(data);
    if is_user_name_taken(tx, &user_name, exclude_id).await? {
        user_name = data.id.clone();
    }
    // the external id itself may be a local user name already
    let mut suffix: u32 = 1;
    while is_user_name_taken(tx, &user_name, exclude_id).await? {
        suffix += 1;
        user_name = format!("{}_{}", data.id, suffix);
    }
    match existing {
        Some(mut user) => {
            user.user_name = user_name;
            user.email = data.primary_email();
            user.first_name = data.first_name.clone();
            user.last_name = data.last_name.clone();
            user.is_active = true;
            update_user(tx, &mut user, None, now).await?;
            Ok(user)
        }
        None => {
            let user = User {
                id: Uuid::now_v7(),
                user_name,
                password: unusable_password_hash().map_err(|err| anyhow::anyhow!(err))?,
                email: data.primary_email(),
                first_name: data.first_name.clone(),
                last_name: data.last_name.clone(),
                external_id: Some(data.id.clone()),
                is_active: true,
                created_by: None,
                updated_by: None,
                created_date: Some(*now),
                updated_date: Some(*now),
            };
            create_user(tx, &user).await?;
            Ok(user)
        }
    }
}

pub struct ApiWebhook;

#[OpenApi]
impl ApiWebhook {
    /// User provisioning events from the identity provider
    #[oai(path = "/webhook/user/", method = "post", tag = "ApiWebhookTags::Webhook")]
    async fn user_webhook_api(
        &self,
        #[oai(name = "x-webhook-secret")] secret: Header<Option<String>>,
        Json(json): Json<WebhookUserEvent>,
        state: Data<&Arc<AppState>>,
    ) -> WebhookResponses {
        let config = get_config();
        // an empty configured secret disables the endpoint
        let authorized = !config.webhook_secret.is_empty()
            && secret.0.as_deref() == Some(config.webhook_secret.as_str());
        if !authorized {
            warn!("rejected {} webhook with invalid secret", json.event_type);
            return WebhookResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }
        if json.data.id.trim().is_empty() {
            return WebhookResponses::BadRequest(Json(BadRequestResponse {
                message: "data.id is required".to_string(),
            }));
        }

        let Some(event) = UserEvent::parse(&json.event_type) else {
            info!("ignored webhook event {}", json.event_type);
            return WebhookResponses::Ok(Json(WebhookResponse {
                event_type: json.event_type,
                handled: false,
                user_id: None,
            }));
        };

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return WebhookResponses::InternalServerError(Json(internal_error(
                    LOCATION,
                    "user_webhook_api",
                    "begin transaction",
                    err,
                )))
            }
        };

        let now = Local::now().fixed_offset();
        let user = match event {
            UserEvent::Upsert => match upsert_provisioned_user(&mut tx, &json.data, &now).await {
                Ok(val) => Some(val),
                Err(err) => {
                    return WebhookResponses::InternalServerError(Json(internal_error(
                        LOCATION,
                        "user_webhook_api",
                        "upsert_provisioned_user",
                        err,
                    )))
                }
            },
            UserEvent::Deactivate => {
                let existing = match get_user_by_external_id(&mut tx, &json.data.id).await {
                    Ok(val) => val,
                    Err(err) => {
                        return WebhookResponses::InternalServerError(Json(internal_error(
                            LOCATION,
                            "user_webhook_api",
                            "get_user_by_external_id",
                            err,
                        )))
                    }
                };
                match existing {
                    Some(mut user) => {
                        if let Err(err) = soft_delete_user(&mut tx, &mut user, None, &now).await {
                            return WebhookResponses::InternalServerError(Json(internal_error(
                                LOCATION,
                                "user_webhook_api",
                                "soft_delete_user",
                                err,
                            )));
                        }
                        Some(user)
                    }
                    None => None,
                }
            }
        };

        if let Err(err) = tx.commit().await {
            return WebhookResponses::InternalServerError(Json(internal_error(
                LOCATION,
                "user_webhook_api",
                "commit transaction",
                err,
            )));
        }
        info!(
            "webhook {} for external user {} applied",
            json.event_type, json.data.id
        );
        WebhookResponses::Ok(Json(WebhookResponse {
            event_type: json.event_type,
            handled: user.is_some(),
            user_id: user.map(|x| x.id.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::webhook::WebhookEmailAddress;

    use super::*;

    fn data(username: Option<&str>, email: Option<&str>) -> WebhookUserData {
        WebhookUserData {
            id: "user_2abc".to_string(),
            username: username.map(|x| x.to_string()),
            email_addresses: email.map(|x| {
                vec![WebhookEmailAddress {
                    email_address: x.to_string(),
                }]
            }),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_user_event_parse() {
        assert_eq!(UserEvent::parse("user.created"), Some(UserEvent::Upsert));
        assert_eq!(UserEvent::parse("user.updated"), Some(UserEvent::Upsert));
        assert_eq!(UserEvent::parse("user.deleted"), Some(UserEvent::Deactivate));
        assert_eq!(UserEvent::parse("session.created"), None);
    }

    #[test]
    fn test_provisioned_user_name() {
        assert_eq!(
            provisioned_user_name(&data(Some("budi"), Some("other@mail.com"))),
            "budi"
        );
        assert_eq!(
            provisioned_user_name(&data(Some(" "), Some("siti@mail.com"))),
            "siti"
        );
        assert_eq!(provisioned_user_name(&data(None, None)), "user_2abc");
    }
}
