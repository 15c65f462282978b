//! Tenant entity and the requests that create or connect one

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub microsoft365: Option<Microsoft365Connection>,
    #[serde(default)]
    pub guarantees: Vec<Guarantee>,
}

impl Tenant {
    pub fn is_connected(&self) -> bool {
        self.microsoft365.as_ref().is_some_and(|c| c.connected)
    }
}

/// Read side of the M365 connection; the backend never echoes the secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microsoft365Connection {
    pub client_id: String,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantee {
    pub key: String,
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuaranteeToggle {
    pub key: String,
    pub enabled: bool,
}

/// Body of `PATCH /api/tenants/:id/guarantees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuaranteeUpdate {
    pub guarantees: Vec<GuaranteeToggle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Tenant name must be between 2 and 100 characters"
    ))]
    pub name: String,

    #[validate(custom(function = "validate_domain"))]
    pub domain: String,
}

impl CreateTenantRequest {
    pub fn new(name: &str, domain: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            domain: domain.trim().to_lowercase(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct M365Credentials {
    #[validate(length(min = 1, message = "Client id is required"))]
    pub client_id: String,

    #[validate(length(min = 1, message = "Client secret is required"))]
    pub client_secret: String,
}

impl fmt::Debug for M365Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("M365Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

fn validate_domain(domain: &str) -> Result<(), ValidationError> {
    let labels: Vec<&str> = domain.split('.').collect();
    let well_formed = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("domain").with_message("Domain must look like contoso.com".into()))
    }
}
