use crate::domain::result::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One multicast push call: a token list, a string data map, and the
/// platform notification block shown by devices that display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastPush {
    pub tokens: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub notification: PushNotificationBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationBlock {
    pub title: String,
    pub body: String,
}

/// Trait for the outbound multicast send.
///
/// Per-token delivery failures are the push platform's concern; an
/// implementation only errors when the call itself cannot be made.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_multicast(&self, push: &MulticastPush) -> DomainResult<()>;
}
