use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, Auth, Transport};
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Return the bearer token: the configured access token if there is one,
/// otherwise a fresh app-only token from the client-credentials exchange.
pub fn get_token(config: &Config, transport: &dyn Transport) -> Result<String> {
    if let Some(token) = &config.access_token {
        return Ok(token.clone());
    }

    let (Some(key), Some(secret)) = (&config.api_key, &config.api_secret) else {
        return Err(Error::MissingCredentials);
    };

    let request = ApiRequest::post_form(
        &config.token_url,
        Auth::Basic {
            user: key.clone(),
            password: secret.clone(),
        },
        "grant_type=client_credentials",
    );
    let body = transport.execute(&request)?;
    parse_token(&body)
}

fn parse_token(body: &[u8]) -> Result<String> {
    let resp: TokenResponse = serde_json::from_slice(body).map_err(|e| Error::json(body, e))?;
    Ok(resp.access_token)
}
