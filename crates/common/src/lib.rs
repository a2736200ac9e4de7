pub mod domain;
pub mod nats;
pub mod postgres;
pub mod telemetry;

pub use domain::*;
pub use nats::*;
pub use postgres::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockCreditSaleRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockDeviceTokenRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNotificationCreatedProducer;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNotificationRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPushSender;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamConsumer;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamPublisher;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockPullConsumer;
