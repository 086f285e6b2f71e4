use crate::domain::application::application::Application;
use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{DeviceName, ModuleName};
use crate::error::{Error, Result};

/// Module -> hosting devices, in insertion order. A module may be replicated
/// on several devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementMapping {
    entries: Vec<(ModuleName, Vec<DeviceName>)>,
}

impl PlacementMapping {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add_module_to_device(&mut self, module: &str, device: &DeviceName) {
        let module = ModuleName::new(module);

        match self.entries.iter_mut().find(|(m, _)| *m == module) {
            Some((_, devices)) => {
                if !devices.contains(device) {
                    devices.push(device.clone());
                }
            }
            None => self.entries.push((module, vec![device.clone()])),
        }
    }

    pub fn devices_for(&self, module: &ModuleName) -> &[DeviceName] {
        self.entries.iter().find(|(m, _)| m == module).map(|(_, devices)| devices.as_slice()).unwrap_or(&[])
    }

    pub fn hosts(&self, module: &ModuleName, device: &DeviceName) -> bool {
        self.devices_for(module).contains(device)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ModuleName, &[DeviceName])> + '_ {
        self.entries.iter().map(|(module, devices)| (module, devices.as_slice()))
    }

    /// Every declared module must be placed on at least one device, and every
    /// named device must exist in `topology`.
    pub fn validate(&self, app: &Application, topology: &Topology) -> Result<()> {
        for module in app.modules() {
            if self.devices_for(&module.name).is_empty() {
                return Err(Error::ModelConstructionError(format!("Module {} is not placed on any device", module.name)));
            }
        }

        for (module, devices) in self.entries() {
            if app.module(module).is_none() {
                return Err(Error::UnknownModule(module.to_string()));
            }
            if let Some(missing) = devices.iter().find(|device| topology.by_name(device).is_none()) {
                return Err(Error::UnknownDevice(missing.to_string()));
            }
        }

        Ok(())
    }
}
