//! Facebook Graph API user lookup.

use async_trait::async_trait;
use serde::Deserialize;

use super::{OAuth2Util, ProviderError, ProviderType, ScimUser, fetch_json};
use crate::client::HttpClient;

const FACEBOOK_ME_URL: &str =
    "https://graph.facebook.com/v3.2/me?fields=id,name,email,first_name,last_name";

#[derive(Debug, Deserialize)]
struct FacebookMe {
    name: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Facebook capability backed by the Graph API `/me` node.
#[derive(Debug, Clone)]
pub struct FacebookUtil {
    client: Option<HttpClient>,
    me_url: String,
}

impl FacebookUtil {
    /// Use a different `/me` URL (must request the same fields).
    pub fn with_me_url(mut self, url: impl Into<String>) -> Self {
        self.me_url = url.into();
        self
    }
}

impl Default for FacebookUtil {
    fn default() -> Self {
        Self {
            client: None,
            me_url: FACEBOOK_ME_URL.to_string(),
        }
    }
}

#[async_trait]
impl OAuth2Util for FacebookUtil {
    fn set_client(&mut self, client: HttpClient) {
        self.client = Some(client);
    }

    async fn get_scim_user(&self) -> Result<ScimUser, ProviderError> {
        let me: FacebookMe =
            fetch_json(self.client.as_ref(), ProviderType::Facebook, &self.me_url).await?;

        Ok(ScimUser::from_profile(me.email, me.first_name, me.last_name, me.name))
    }
}
