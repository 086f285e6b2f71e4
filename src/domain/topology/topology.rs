use slotmap::SlotMap;

use crate::domain::simulator::simulator::RunOutput;
use crate::domain::topology::device::{Device, DeviceKey, DeviceSpec, Tier};
use crate::domain::utils::id::DeviceName;
use crate::error::{Error, Result};

pub const CLOUD_NAME: &str = "cloud";
pub const EDGE_NAME_PREFIX: &str = "edge-";

/// Uplink latency of the first edge device; every further edge adds
/// `EDGE_UPLINK_LATENCY_STEP`.
pub const EDGE_BASE_UPLINK_LATENCY: f64 = 30.0;
pub const EDGE_UPLINK_LATENCY_STEP: f64 = 5.0;

pub const CLOUD_SPEC: DeviceSpec = DeviceSpec {
    mips: 56_000,
    ram: 64_000,
    uplink_bandwidth: 125_000,
    downlink_bandwidth: 125_000,
    tier: Tier::CLOUD,
    busy_power: 107.33,
    idle_power: 83.44,
};

pub const EDGE_SPEC: DeviceSpec = DeviceSpec {
    mips: 16_000,
    ram: 16_000,
    uplink_bandwidth: 12_500,
    downlink_bandwidth: 12_500,
    tier: Tier::EDGE,
    busy_power: 87.5,
    idle_power: 82.4,
};

/// Device tree with exactly one root.
///
/// Devices live in a `SlotMap`; `order` keeps the insertion order so that
/// reports list the cloud first and the edges by index.
#[derive(Debug, Clone)]
pub struct Topology {
    devices: SlotMap<DeviceKey, Device>,
    order: Vec<DeviceKey>,
    root: Option<DeviceKey>,
}

impl Topology {
    pub fn new() -> Self {
        Self { devices: SlotMap::with_key(), order: Vec::new(), root: None }
    }

    pub fn add_root(&mut self, device: Device) -> Result<DeviceKey> {
        if self.root.is_some() {
            return Err(Error::ModelConstructionError(format!("Topology already has a root, can not add {} as second root", device.name)));
        }
        if !device.tier.is_root() {
            return Err(Error::ModelConstructionError(format!("Root device {} must be on tier 0, got {:?}", device.name, device.tier)));
        }
        self.ensure_unique_name(&device.name)?;

        let key = self.devices.insert(device);
        self.order.push(key);
        self.root = Some(key);
        Ok(key)
    }

    pub fn add_child(&mut self, mut device: Device, parent: DeviceKey, uplink_latency: f64) -> Result<DeviceKey> {
        let parent_tier = match self.devices.get(parent) {
            Some(parent_device) => parent_device.tier,
            None => return Err(Error::ModelConstructionError(format!("Parent of device {} is not part of the topology", device.name))),
        };
        if device.tier.0 != parent_tier.0 + 1 {
            return Err(Error::ModelConstructionError(format!(
                "Device {} on {:?} can not be a child of a device on {:?}",
                device.name, device.tier, parent_tier
            )));
        }
        if uplink_latency < 0.0 {
            return Err(Error::ModelConstructionError(format!("Device {} has negative uplink latency", device.name)));
        }
        self.ensure_unique_name(&device.name)?;

        device.parent = Some(parent);
        device.uplink_latency = Some(uplink_latency);

        let key = self.devices.insert(device);
        self.order.push(key);
        Ok(key)
    }

    fn ensure_unique_name(&self, name: &DeviceName) -> Result<()> {
        if self.devices.values().any(|d| &d.name == name) {
            return Err(Error::ModelConstructionError(format!("Device name {} is used twice", name)));
        }
        Ok(())
    }

    pub fn get(&self, key: DeviceKey) -> Option<&Device> {
        self.devices.get(key)
    }

    pub fn key_of(&self, name: &DeviceName) -> Option<DeviceKey> {
        self.order.iter().copied().find(|key| &self.devices[*key].name == name)
    }

    pub fn by_name(&self, name: &DeviceName) -> Option<&Device> {
        self.key_of(name).map(|key| &self.devices[key])
    }

    pub fn root_key(&self) -> Option<DeviceKey> {
        self.root
    }

    pub fn cloud(&self) -> Option<&Device> {
        self.root.and_then(|key| self.devices.get(key))
    }

    /// All devices, root first, in insertion order.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceKey, &Device)> + '_ {
        self.order.iter().map(move |key| (*key, &self.devices[*key]))
    }

    /// Non-root devices in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (DeviceKey, &Device)> + '_ {
        self.devices().filter(|(_, device)| device.is_edge())
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn children(&self, parent: DeviceKey) -> Vec<DeviceKey> {
        self.order.iter().copied().filter(|key| self.devices[*key].parent == Some(parent)).collect()
    }

    /// Keys from `key` up to the root, starting with `key` itself.
    pub fn path_to_root(&self, key: DeviceKey) -> Vec<DeviceKey> {
        let mut path = Vec::new();
        let mut current = Some(key);
        while let Some(k) = current {
            path.push(k);
            current = self.devices.get(k).and_then(|d| d.parent);
        }
        path
    }

    /// Copies the per-device energy of a finished run onto the devices.
    pub fn record_energy(&mut self, output: &RunOutput) {
        for device in self.devices.values_mut() {
            device.energy_consumed = output.device_energy(&device.name);
        }
    }

    /// Sum of the energy each device consumed during the last run.
    pub fn total_energy(&self) -> f64 {
        self.devices().map(|(_, device)| device.energy_consumed).sum()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the two-tier hierarchy: one cloud root and `edge_count` edge
/// devices below it, edge `i` with uplink latency `30 + 5 * i`.
pub fn build_topology(edge_count: usize) -> Result<Topology> {
    if edge_count == 0 {
        return Err(Error::ModelConstructionError("Topology needs at least one edge device".to_string()));
    }

    let mut topology = Topology::new();
    let cloud_key = topology.add_root(Device::try_new(CLOUD_NAME, &CLOUD_SPEC)?)?;

    for i in 0..edge_count {
        let edge = Device::try_new(format!("{}{}", EDGE_NAME_PREFIX, i).as_str(), &EDGE_SPEC)?;
        let latency = EDGE_BASE_UPLINK_LATENCY + i as f64 * EDGE_UPLINK_LATENCY_STEP;
        topology.add_child(edge, cloud_key, latency)?;
    }

    log::debug!("Built topology with 1 cloud device and {} edge devices.", edge_count);
    Ok(topology)
}
