//! Normalized user profile shared by all providers.

use serde::{Deserialize, Serialize};

/// A user's name parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub given_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub family_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formatted: String,
}

/// An email address attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimEmail {
    pub value: String,

    #[serde(default)]
    pub primary: bool,
}

/// SCIM-style user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    #[serde(default)]
    pub name: ScimName,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ScimEmail>,
}

impl ScimUser {
    /// Build a user from the fields every provider returns.
    ///
    /// The email doubles as the user name and is marked primary.
    pub fn from_profile(
        email: Option<String>,
        given_name: Option<String>,
        family_name: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        let given_name = given_name.unwrap_or_default();
        let family_name = family_name.unwrap_or_default();
        let display_name = display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} {}", given_name, family_name).trim().to_string());

        let emails = email
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| ScimEmail {
                value: e.trim().to_string(),
                primary: true,
            })
            .collect::<Vec<_>>();

        Self {
            user_name: emails.first().map(|e| e.value.clone()).unwrap_or_default(),
            display_name: display_name.clone(),
            name: ScimName {
                given_name,
                family_name,
                formatted: display_name,
            },
            emails,
        }
    }

    /// The primary email, if any.
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary)
            .or_else(|| self.emails.first())
            .map(|e| e.value.as_str())
    }
}
