use anyhow::Result;

use crate::config::{
    config_model::{Database, DotEnvyConfig, Server, TokenSecret},
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let token = get_token_secret()?;

    Ok(DotEnvyConfig {
        server,
        database,
        token,
    })
}

pub fn get_token_secret() -> Result<TokenSecret> {
    dotenvy::dotenv().ok();

    Ok(TokenSecret {
        secret: std::env::var("JWT_ACCESS_SECRET").expect("JWT_ACCESS_SECRET is invalid"),
        refresh_secret: std::env::var("JWT_REFRESH_SECRET").expect("JWT_REFRESH_SECRET is invalid"),
        access_ttl_seconds: std::env::var("JWT_ACCESS_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?,
        refresh_ttl_seconds: std::env::var("JWT_REFRESH_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()?,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}
