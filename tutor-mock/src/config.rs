//! Mock server configuration, read from the environment
//!
//! | Variable | Default |
//! |----------|---------|
//! | MOCK_HTTP_PORT | 8080 |
//! | MOCK_TOKENS | one `<role>-token` per role |
//!
//! `MOCK_TOKENS` is a comma separated list of `token=user_id:role` entries.

use shared::models::Role;

use crate::state::MockUser;

pub struct Config {
    pub http_port: u16,
    pub tokens: Option<Vec<(String, MockUser)>>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let http_port = std::env::var("MOCK_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let tokens = match std::env::var("MOCK_TOKENS") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_tokens(&raw)?),
            _ => None,
        };
        Ok(Self { http_port, tokens })
    }
}

fn parse_tokens(raw: &str) -> anyhow::Result<Vec<(String, MockUser)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> anyhow::Result<(String, MockUser)> {
            let (token, identity) = entry
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("MOCK_TOKENS entry '{entry}' is missing '='"))?;
            let (user_id, role) = identity.split_once(':').unwrap_or((identity, "student"));
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            Ok((token.trim().to_string(), MockUser::new(user_id.trim(), role)))
        })
        .collect()
}
