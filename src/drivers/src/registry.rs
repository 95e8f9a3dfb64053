//! Registry of probed devices and their reserved memory regions.
//!
//! Replaces per-driver "already probed" flags: every probe claims its region
//! here first, and the claim fails if the region is taken or the device kind
//! only allows a single instance.

use alloc::collections::BTreeMap;
use lazy_static::lazy_static;
use log::{error, info};
use lowrisc_common::{DeviceId, DeviceKind, DriverError, MemRegion};
use spin::Mutex;

/// One claimed device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// Device kind that made the claim.
    pub kind: DeviceKind,
    /// Reserved register window.
    pub region: MemRegion,
}

/// Tracks claimed regions and enforces single-instance device kinds.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    claims: BTreeMap<DeviceId, Claim>,
}

impl DeviceRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            claims: BTreeMap::new(),
        }
    }

    /// Reserve `region` for a new device of `kind`.
    pub fn claim(&mut self, kind: DeviceKind, region: MemRegion) -> Result<DeviceId, DriverError> {
        if kind.single_instance() && self.is_claimed(kind) {
            error!("{}: only one instance allowed", kind);
            return Err(DriverError::AlreadyProbed);
        }
        if self.claims.values().any(|c| c.region.overlaps(&region)) {
            error!("{}: cannot request region {}", kind, region);
            return Err(DriverError::RegionBusy);
        }

        let id = DeviceId::next();
        self.claims.insert(id, Claim { kind, region });
        info!("{}: claimed {} as device {}", kind, region, id.as_u32());
        Ok(id)
    }

    /// Release a claim. Returns false if `id` was not claimed.
    pub fn release(&mut self, id: DeviceId) -> bool {
        self.claims.remove(&id).is_some()
    }

    /// Whether any device of `kind` is currently claimed.
    pub fn is_claimed(&self, kind: DeviceKind) -> bool {
        self.claims.values().any(|c| c.kind == kind)
    }

    /// Look up a claim by id.
    pub fn get(&self, id: DeviceId) -> Option<Claim> {
        self.claims.get(&id).copied()
    }

    /// Number of live claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no device is claimed.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

lazy_static! {
    /// The system-wide device registry.
    pub static ref DEVICES: Mutex<DeviceRegistry> = Mutex::new(DeviceRegistry::new());
}
