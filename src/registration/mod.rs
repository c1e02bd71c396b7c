//! Registration gate.
//!
//! The capability subsystem needs two facts from the IMS engine: whether the
//! current network interface is registered, and if not, why. The engine may
//! not exist yet (service starting up) and may not have a current network
//! interface (between bearers). Both cases read as "not registered, reason
//! unspecified" rather than as failures.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::utilities::errors::GateError;

/// Why the service is not registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    #[default]
    Unspecified,
    ConnectionLost,
    BatteryLow,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReasonCode::Unspecified => "unspecified",
            ReasonCode::ConnectionLost => "connection_lost",
            ReasonCode::BatteryLow => "battery_low",
        };
        f.write_str(s)
    }
}

/// The network interface currently used by the IMS engine.
pub trait NetworkInterface: Send + Sync {
    fn is_registered(&self) -> bool;
    fn registration_reason(&self) -> ReasonCode;
}

/// The IMS engine, as far as the capability subsystem is concerned.
pub trait ImsEngine: Send + Sync {
    /// The interface in use, if any.
    fn current_network_interface(&self) -> Option<Arc<dyn NetworkInterface>>;
}

/// Answers registration queries against an engine that may not exist yet.
#[derive(Default)]
pub struct RegistrationGate {
    engine: RwLock<Option<Arc<dyn ImsEngine>>>,
}

impl fmt::Debug for RegistrationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationGate")
            .field("engine_attached", &self.engine.read().is_some())
            .finish()
    }
}

impl RegistrationGate {
    /// A gate with no engine attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate already bound to `engine`.
    pub fn with_engine(engine: Arc<dyn ImsEngine>) -> Self {
        Self {
            engine: RwLock::new(Some(engine)),
        }
    }

    /// Attach the engine once it has been constructed.
    pub fn attach(&self, engine: Arc<dyn ImsEngine>) {
        *self.engine.write() = Some(engine);
        log::debug!("IMS engine attached to registration gate");
    }

    /// Drop the engine, e.g. on service shutdown.
    pub fn detach(&self) {
        *self.engine.write() = None;
        log::debug!("IMS engine detached from registration gate");
    }

    fn network_interface(&self) -> Result<Option<Arc<dyn NetworkInterface>>, GateError> {
        let engine = self.engine.read().clone().ok_or(GateError::CoreUnavailable)?;
        Ok(engine.current_network_interface())
    }

    /// Whether the engine exists and its current interface is registered.
    pub fn is_registered(&self) -> bool {
        matches!(self.network_interface(), Ok(Some(iface)) if iface.is_registered())
    }

    /// Reason reported by the current interface, `Unspecified` if there is
    /// no engine or no interface.
    pub fn registration_reason(&self) -> ReasonCode {
        match self.network_interface() {
            Ok(Some(iface)) => iface.registration_reason(),
            _ => ReasonCode::Unspecified,
        }
    }

    /// Fails with [`GateError::CoreUnavailable`] until an engine is attached.
    pub fn require_core(&self) -> Result<(), GateError> {
        if self.engine.read().is_none() {
            return Err(GateError::CoreUnavailable);
        }
        Ok(())
    }

    /// Fails with [`GateError::NotRegistered`] unless registered.
    pub fn require_registered(&self) -> Result<(), GateError> {
        if self.is_registered() {
            return Ok(());
        }
        let reason = self.registration_reason();
        log::debug!("Not registered to IMS (reason: {})", reason);
        Err(GateError::NotRegistered { reason })
    }

    /// Gate for traffic on behalf of an IMS extension.
    pub fn require_extension(&self, service_id: &str) -> Result<(), GateError> {
        self.require_registered().map_err(|e| {
            log::warn!("Extension {} refused: {}", service_id, e);
            e
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Network interface whose registration state tests can flip.
    #[derive(Debug)]
    pub struct FakeInterface {
        registered: AtomicBool,
        reason: ReasonCode,
    }

    impl FakeInterface {
        pub fn new(registered: bool, reason: ReasonCode) -> Arc<Self> {
            Arc::new(Self {
                registered: AtomicBool::new(registered),
                reason,
            })
        }

        pub fn set_registered(&self, registered: bool) {
            self.registered.store(registered, Ordering::SeqCst);
        }
    }

    impl NetworkInterface for FakeInterface {
        fn is_registered(&self) -> bool {
            self.registered.load(Ordering::SeqCst)
        }

        fn registration_reason(&self) -> ReasonCode {
            self.reason
        }
    }

    /// Engine with an optional interface.
    pub struct FakeEngine(pub Option<Arc<FakeInterface>>);

    impl ImsEngine for FakeEngine {
        fn current_network_interface(&self) -> Option<Arc<dyn NetworkInterface>> {
            self.0
                .clone()
                .map(|iface| iface as Arc<dyn NetworkInterface>)
        }
    }

    pub fn registered_gate() -> (Arc<RegistrationGate>, Arc<FakeInterface>) {
        let iface = FakeInterface::new(true, ReasonCode::Unspecified);
        let gate = RegistrationGate::with_engine(Arc::new(FakeEngine(Some(iface.clone()))));
        (Arc::new(gate), iface)
    }
}
