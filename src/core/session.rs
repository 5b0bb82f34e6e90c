use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub user_name: String,
    pub refresh_token: String,
}

/// Store the access token as the session key, expiring with the token.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: String,
    refresh_token: String,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        user_name: user.user_name.clone(),
        refresh_token,
    };
    let session_json = serde_json::to_string(&session_data)?;
    // jwt_exp is in minutes
    redis::Cmd::set_ex(token, session_json, config.jwt_exp as u64 * 60).exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("GET").arg(token).query(redis_conn)?;
    match res {
        Some(val) => Ok(Some(serde_json::from_str(val.as_str())?)),
        None => Ok(None),
    }
}

pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<bool> {
    let session_data = match get_session(redis_conn, token.clone())? {
        Some(val) => val,
        None => return Ok(false),
    };
    redis::cmd("DEL")
        .arg(session_data.refresh_token)
        .exec(redis_conn)?;
    redis::cmd("DEL").arg(token).exec(redis_conn)?;
    Ok(true)
}

/// Round-trip check used by the health endpoint.
pub fn ping<C: ConnectionLike>(redis_conn: &mut C) -> anyhow::Result<String> {
    let res: String = redis::cmd("PING").query(redis_conn)?;
    Ok(res)
}
