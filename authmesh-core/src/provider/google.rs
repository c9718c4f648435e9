//! Google user info.

use async_trait::async_trait;
use serde::Deserialize;

use super::{OAuth2Util, ProviderError, ProviderType, ScimUser, fetch_json};
use crate::client::HttpClient;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
struct GoogleUserinfo {
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

/// Google capability backed by the OAuth2 userinfo endpoint.
#[derive(Debug, Clone)]
pub struct GoogleUtil {
    client: Option<HttpClient>,
    userinfo_url: String,
}

impl GoogleUtil {
    /// Use a different userinfo endpoint.
    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }
}

impl Default for GoogleUtil {
    fn default() -> Self {
        Self {
            client: None,
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

#[async_trait]
impl OAuth2Util for GoogleUtil {
    fn set_client(&mut self, client: HttpClient) {
        self.client = Some(client);
    }

    async fn get_scim_user(&self) -> Result<ScimUser, ProviderError> {
        let info: GoogleUserinfo =
            fetch_json(self.client.as_ref(), ProviderType::Google, &self.userinfo_url).await?;

        Ok(ScimUser::from_profile(
            info.email,
            info.given_name,
            info.family_name,
            info.name,
        ))
    }
}
