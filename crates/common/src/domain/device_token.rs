use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Push registration of one device, scoped to a site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken {
    pub site: String,
    pub token: String,
}

/// Repository input for listing device tokens registered to a site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDeviceTokensRepoInput {
    pub site: String,
}

/// Read-only repository over the `device_tokens` collection
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DeviceTokenRepository: Send + Sync {
    async fn list_device_tokens(
        &self,
        input: ListDeviceTokensRepoInput,
    ) -> DomainResult<Vec<DeviceToken>>;
}
