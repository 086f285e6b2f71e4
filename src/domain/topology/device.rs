use slotmap::new_key_type;

use crate::domain::utils::id::DeviceName;
use crate::error::{Error, Result};

new_key_type! {
    pub struct DeviceKey;
}

/// Number of processing elements every device is split into.
pub const PES_PER_DEVICE: u32 = 4;

/// Position of a device in the cloud -> edge hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tier(pub u32);

impl Tier {
    pub const CLOUD: Tier = Tier(0);
    pub const EDGE: Tier = Tier(1);

    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

/// Static description of a device before it is placed into a topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub mips: u64,
    pub ram: u64,
    pub uplink_bandwidth: u64,
    pub downlink_bandwidth: u64,
    pub tier: Tier,
    pub busy_power: f64,
    pub idle_power: f64,
}

#[derive(Debug, Clone)]
pub struct Device {
    pub name: DeviceName,
    pub tier: Tier,

    /// Number of processing elements the capacity is divided into.
    pub pe_count: u32,

    /// Rate of a single processing element in MIPS.
    pub pe_mips: u64,

    pub ram: u64,
    pub uplink_bandwidth: u64,
    pub downlink_bandwidth: u64,

    /// `None` for the root device.
    pub parent: Option<DeviceKey>,

    /// Latency of the link towards the parent. `None` for the root device.
    pub uplink_latency: Option<f64>,

    pub busy_power: f64,
    pub idle_power: f64,

    /// Filled in from the engine's run output after a scenario finished.
    pub energy_consumed: f64,
}

impl Device {
    pub fn try_new(name: impl Into<DeviceName>, spec: &DeviceSpec) -> Result<Self> {
        let name = name.into();

        if spec.mips == 0 || spec.ram == 0 {
            return Err(Error::ModelConstructionError(format!("Device {} needs positive mips and ram", name)));
        }
        if spec.uplink_bandwidth == 0 || spec.downlink_bandwidth == 0 {
            return Err(Error::ModelConstructionError(format!("Device {} needs positive link bandwidth", name)));
        }
        if spec.busy_power < spec.idle_power || spec.idle_power < 0.0 {
            return Err(Error::ModelConstructionError(format!(
                "Device {} has inconsistent power coefficients (busy {}, idle {})",
                name, spec.busy_power, spec.idle_power
            )));
        }

        Ok(Device {
            name,
            tier: spec.tier,
            pe_count: PES_PER_DEVICE,
            pe_mips: spec.mips / PES_PER_DEVICE as u64,
            ram: spec.ram,
            uplink_bandwidth: spec.uplink_bandwidth,
            downlink_bandwidth: spec.downlink_bandwidth,
            parent: None,
            uplink_latency: None,
            busy_power: spec.busy_power,
            idle_power: spec.idle_power,
            energy_consumed: 0.0,
        })
    }

    /// Total compute capacity in MIPS.
    pub fn mips(&self) -> u64 {
        self.pe_mips * self.pe_count as u64
    }

    pub fn is_edge(&self) -> bool {
        !self.tier.is_root()
    }
}
