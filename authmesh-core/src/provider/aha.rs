//! Aha! current user lookup.

use async_trait::async_trait;
use serde::Deserialize;

use super::{OAuth2Util, ProviderError, ProviderType, ScimUser, fetch_json};
use crate::client::HttpClient;

const AHA_ME_URL: &str = "https://secure.aha.io/api/v1/me";

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: AhaUser,
}

#[derive(Debug, Deserialize)]
struct AhaUser {
    name: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Aha! capability. Accounts live on per-company subdomains, so callers
/// usually set [`with_me_url`](Self::with_me_url).
#[derive(Debug, Clone)]
pub struct AhaUtil {
    client: Option<HttpClient>,
    me_url: String,
}

impl AhaUtil {
    pub fn with_me_url(mut self, url: impl Into<String>) -> Self {
        self.me_url = url.into();
        self
    }
}

impl Default for AhaUtil {
    fn default() -> Self {
        Self {
            client: None,
            me_url: AHA_ME_URL.to_string(),
        }
    }
}

#[async_trait]
impl OAuth2Util for AhaUtil {
    fn set_client(&mut self, client: HttpClient) {
        self.client = Some(client);
    }

    async fn get_scim_user(&self) -> Result<ScimUser, ProviderError> {
        let me: MeResponse = fetch_json(self.client.as_ref(), ProviderType::Aha, &self.me_url).await?;

        Ok(ScimUser::from_profile(
            me.user.email,
            me.user.first_name,
            me.user.last_name,
            me.user.name,
        ))
    }
}
