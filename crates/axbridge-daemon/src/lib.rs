//! Automation bridge daemon.
//!
//! Owns the process-wide [`AutomationBridge`], the session store and the
//! element handles clients address by id. Requests arrive as
//! [`axbridge_ipc::RpcRequest`] values and are routed by
//! [`UseCaseContainer::dispatch`].

#![deny(clippy::all)]

pub mod adapters;
mod bridge;
mod clock;
mod config;
pub mod domain;
mod element;
mod error;
mod geometry;
pub mod handlers;
mod platform;
mod repository;
mod resolver;
mod session;
mod settings;
mod telemetry;
mod usecase_container;
pub mod usecases;

#[cfg(test)]
mod test_support;

pub use bridge::AutomationBridge;
pub use bridge::BridgeSlot;
pub use bridge::IdleWait;
pub use bridge::DEFAULT_GLOBAL_IDLE_TIMEOUT;
pub use bridge::GLOBAL_BRIDGE;
pub use bridge::QUICK_IDLE_TIMEOUT;
pub use clock::Clock;
pub use clock::MockClock;
pub use clock::RealClock;
pub use config::DaemonConfig;
pub use element::ElementHandle;
pub use element::ElementKind;
pub use element::FastElement;
pub use element::LegacyElement;
pub use error::BridgeError;
pub use geometry::GeometryHelper;
pub use platform::AutomationPlatform;
pub use platform::PlatformError;
pub use platform::ServiceFlags;
pub use repository::SessionRepository;
pub use resolver::ElementResolver;
pub use resolver::Enumeration;
pub use resolver::DEFAULT_FIND_ALL_LIMIT;
pub use session::KnownElements;
pub use session::Session;
pub use session::SessionId;
pub use session::SessionInfo;
pub use session::SessionManager;
pub use session::DEFAULT_LOCK_TIMEOUT;
pub use settings::ConfigRegistry;
pub use settings::Setting;
pub use settings::SettingType;
pub use settings::SettingsError;
pub use telemetry::init_tracing;
pub use telemetry::TelemetryGuard;
pub use usecase_container::UseCaseContainer;

pub type Result<T> = std::result::Result<T, BridgeError>;
