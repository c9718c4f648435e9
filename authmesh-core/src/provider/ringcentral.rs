//! RingCentral extension lookup.

use async_trait::async_trait;
use serde::Deserialize;

use super::{OAuth2Util, ProviderError, ProviderType, ScimUser, fetch_json};
use crate::client::HttpClient;

/// Production platform server.
pub const RINGCENTRAL_SERVER_URL: &str = "https://platform.ringcentral.com";

const EXTENSION_PATH: &str = "restapi/v1.0/account/~/extension/~";

#[derive(Debug, Deserialize)]
struct Extension {
    name: Option<String>,
    #[serde(default)]
    contact: Contact,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Contact {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
}

/// RingCentral capability reading the current extension.
///
/// The server URL defaults to production; point it at a sandbox server with
/// [`with_server_url`](Self::with_server_url).
#[derive(Debug, Clone)]
pub struct RingCentralUtil {
    client: Option<HttpClient>,
    server_url: String,
}

impl RingCentralUtil {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }
}

impl Default for RingCentralUtil {
    fn default() -> Self {
        Self {
            client: None,
            server_url: RINGCENTRAL_SERVER_URL.to_string(),
        }
    }
}

#[async_trait]
impl OAuth2Util for RingCentralUtil {
    fn set_client(&mut self, client: HttpClient) {
        self.client = Some(client);
    }

    async fn get_scim_user(&self) -> Result<ScimUser, ProviderError> {
        let url = format!("{}/{}", self.server_url.trim_end_matches('/'), EXTENSION_PATH);
        let extension: Extension =
            fetch_json(self.client.as_ref(), ProviderType::RingCentral, &url).await?;

        Ok(ScimUser::from_profile(
            extension.contact.email,
            extension.contact.first_name,
            extension.contact.last_name,
            extension.name,
        ))
    }
}
