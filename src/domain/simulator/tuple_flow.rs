use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use dslab_compute::multicore::{CompFailed, CompFinished, CompStarted, Compute, CoresDependency};
use dslab_core::{Event, EventHandler, Id, Simulation, SimulationContext, cast};
use sugars::{rc, refcell};

use crate::domain::application::app_edge::TupleDirection;
use crate::domain::application::application::Application;
use crate::domain::placement::mapping::PlacementMapping;
use crate::domain::simulator::event::{SensorTick, Tuple, TupleArrived};
use crate::domain::simulator::simulator::{RunOutcome, RunOutput, SimulationEngine};
use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{DeviceName, LoopId, ModuleName, SensorName, TupleType};
use crate::domain::workload::sensor::Sensor;
use crate::error::{Error, Result};

/// Seed of the simulation core. Nothing in a run draws from it, so runs with
/// equal inputs are identical.
const SIMULATION_SEED: u64 = 42;

#[derive(Debug, Clone)]
struct DeviceModel {
    name: DeviceName,
    parent: Option<usize>,
    uplink_latency: f64,
    uplink_bandwidth: f64,
    downlink_bandwidth: f64,
    pe_count: u32,
    pe_mips: u64,
    ram: u64,
    busy_power: f64,
    idle_power: f64,
}

#[derive(Debug, Clone)]
struct SensorModel {
    name: SensorName,
    tuple_type: TupleType,
    gateway: usize,
    interval: f64,
    latency: f64,
    loop_id: Option<LoopId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hop {
    /// Over the uplink of the sending device to its parent.
    Up,
    /// From the sending device down to this child.
    Down(usize),
}

/// Read-only routing view shared by every device of one run.
struct FlowPlan {
    application: Application,
    placement: HashMap<ModuleName, Vec<usize>>,
    parents: Vec<Option<usize>>,
    uplink_latencies: Vec<f64>,
    handlers: Vec<Id>,
}

impl FlowPlan {
    fn hosts(&self, module: &ModuleName, device: usize) -> bool {
        self.placement.get(module).is_some_and(|devices| devices.contains(&device))
    }

    fn path_to_root(&self, device: usize) -> Vec<usize> {
        let mut path = vec![device];
        let mut current = self.parents[device];
        while let Some(parent) = current {
            path.push(parent);
            current = self.parents[parent];
        }
        path
    }

    /// Instance of `module` a tuple at `current` is sent to.
    fn target_device(&self, module: &ModuleName, direction: TupleDirection, current: usize, origin: usize) -> Option<usize> {
        let candidates = match direction {
            TupleDirection::Up => self.path_to_root(current),
            TupleDirection::Down => vec![origin, current],
        };

        candidates
            .into_iter()
            .find(|d| self.hosts(module, *d))
            .or_else(|| self.placement.get(module).and_then(|devices| devices.first().copied()))
    }

    /// First hop from `from` towards `to` in the device tree.
    fn next_hop(&self, from: usize, to: usize) -> Option<Hop> {
        let down_path = self.path_to_root(to);
        match down_path.iter().position(|d| *d == from) {
            Some(0) => None,
            Some(at) => Some(Hop::Down(down_path[at - 1])),
            None => self.parents[from].map(|_| Hop::Up),
        }
    }
}

/// A device of the run: FIFO in front of a multicore compute, plus
/// serialised up and down links.
struct DeviceNode {
    index: usize,
    name: DeviceName,
    plan: Rc<FlowPlan>,

    compute: Rc<RefCell<Compute>>,
    pe_count: u32,
    free_pes: u32,
    waiting: VecDeque<Tuple>,
    running: BTreeMap<u64, (Tuple, f64)>,
    busy_pe_time: f64,

    parent: Option<usize>,
    uplink_latency: f64,
    uplink_bandwidth: f64,
    downlink_bandwidth: f64,
    uplink_free_at: f64,
    downlink_free_at: f64,

    busy_power: f64,
    idle_power: f64,

    selectivity_credit: HashMap<(ModuleName, TupleType), f64>,
    output: Rc<RefCell<RunOutput>>,
    deadline: f64,
    ctx: SimulationContext,
}

impl DeviceNode {
    fn new(
        index: usize,
        model: &DeviceModel,
        plan: Rc<FlowPlan>,
        compute: Rc<RefCell<Compute>>,
        output: Rc<RefCell<RunOutput>>,
        deadline: f64,
        ctx: SimulationContext,
    ) -> Self {
        Self {
            index,
            name: model.name.clone(),
            plan,
            compute,
            pe_count: model.pe_count,
            free_pes: model.pe_count,
            waiting: VecDeque::new(),
            running: BTreeMap::new(),
            busy_pe_time: 0.0,
            parent: model.parent,
            uplink_latency: model.uplink_latency,
            uplink_bandwidth: model.uplink_bandwidth,
            downlink_bandwidth: model.downlink_bandwidth,
            uplink_free_at: 0.0,
            downlink_free_at: 0.0,
            busy_power: model.busy_power,
            idle_power: model.idle_power,
            selectivity_credit: HashMap::new(),
            output,
            deadline,
            ctx,
        }
    }

    /// Processes `tuple` here or forwards it one hop closer to its target.
    fn route(&mut self, tuple: Tuple) {
        if tuple.target == self.index {
            self.waiting.push_back(tuple);
            self.start_waiting();
            return;
        }

        let Some(hop) = self.plan.next_hop(self.index, tuple.target) else {
            log::debug!("{} has no route to device {}, dropping tuple {}.", self.name, tuple.target, tuple.tuple_type);
            return;
        };
        let (next, delay) = self.transfer(hop, tuple.nw_length);
        let destination = self.plan.handlers[next];
        self.ctx.emit(TupleArrived { tuple }, destination, delay);
    }

    /// Occupies the link of `hop`, returns the next device and the delay until
    /// the payload reaches it.
    fn transfer(&mut self, hop: Hop, nw_length: f64) -> (usize, f64) {
        let now = self.ctx.time();
        match hop {
            Hop::Up => {
                let begin = now.max(self.uplink_free_at);
                self.uplink_free_at = begin + nw_length / self.uplink_bandwidth;
                let next = self.parent.unwrap_or(self.index);
                (next, self.uplink_free_at + self.uplink_latency - now)
            }
            Hop::Down(child) => {
                let begin = now.max(self.downlink_free_at);
                self.downlink_free_at = begin + nw_length / self.downlink_bandwidth;
                (child, self.downlink_free_at + self.plan.uplink_latencies[child] - now)
            }
        }
    }

    fn start_waiting(&mut self) {
        while self.free_pes > 0 {
            let Some(tuple) = self.waiting.pop_front() else {
                break;
            };
            let id =
                self.compute.borrow_mut().run(tuple.cpu_length as _, 0, 1, 1, CoresDependency::Linear, self.ctx.id());
            self.running.insert(id, (tuple, self.ctx.time()));
            self.free_pes -= 1;
        }
    }

    fn on_finished(&mut self, id: u64) {
        let Some((tuple, started)) = self.running.remove(&id) else {
            return;
        };
        self.free_pes += 1;

        let now = self.ctx.time();
        self.busy_pe_time += now.min(self.deadline) - started.min(self.deadline);
        self.record_loop_latency(&tuple, now);

        if let Some(next) = self.next_tuple(&tuple) {
            self.route(next);
        }
        self.start_waiting();
    }

    fn on_failed(&mut self, id: u64) {
        if let Some((tuple, _)) = self.running.remove(&id) {
            log::warn!("{} failed to process tuple {}.", self.name, tuple.tuple_type);
            self.free_pes += 1;
        }
        self.start_waiting();
    }

    fn record_loop_latency(&self, tuple: &Tuple, finished: f64) {
        let Some(loop_id) = tuple.loop_id else {
            return;
        };
        let closes_loop = self
            .plan
            .application
            .loops()
            .get(loop_id)
            .is_some_and(|l| tuple.step + 1 == l.steps.len() && l.last_module() == Some(&tuple.destination));
        if closes_loop && finished <= self.deadline {
            self.output.borrow_mut().record_loop_latency(loop_id, finished - tuple.emitted_at);
        }
    }

    /// Applies fractional selectivity, true when an output tuple is due.
    fn emits_output(&mut self, module: &ModuleName, input: &TupleType, selectivity: f64) -> bool {
        let credit = self.selectivity_credit.entry((module.clone(), input.clone())).or_insert(0.0);
        *credit += selectivity;
        if *credit >= 1.0 - f64::EPSILON {
            *credit -= 1.0;
            true
        } else {
            false
        }
    }

    /// Output tuple `tuple`'s module emits once processed, if any.
    fn next_tuple(&mut self, tuple: &Tuple) -> Option<Tuple> {
        let plan = self.plan.clone();
        let mapping = plan.application.mapping_for(&tuple.destination, &tuple.tuple_type)?;
        if !self.emits_output(&mapping.module, &mapping.input, mapping.selectivity) {
            return None;
        }
        let edge = plan.application.module_edge(&tuple.destination, &mapping.output)?;

        let Some(target) = plan.target_device(&edge.destination, edge.direction, self.index, tuple.origin) else {
            log::debug!("No instance of {} placed, dropping tuple {}.", edge.destination, mapping.output);
            return None;
        };

        Some(Tuple {
            tuple_type: mapping.output.clone(),
            destination: edge.destination.clone(),
            direction: edge.direction,
            cpu_length: edge.cpu_length,
            nw_length: edge.nw_length,
            loop_id: tuple.loop_id,
            step: tuple.step + 1,
            origin: tuple.origin,
            target,
            emitted_at: tuple.emitted_at,
        })
    }

    /// Linear power draw integrated over `[0, horizon]`, work still running at
    /// the horizon included.
    fn energy(&self, horizon: f64) -> f64 {
        if horizon <= 0.0 || self.pe_count == 0 {
            return 0.0;
        }
        let in_flight: f64 = self.running.values().map(|(_, started)| horizon - started.min(horizon)).sum();
        let busy_time = ((self.busy_pe_time + in_flight) / self.pe_count as f64).clamp(0.0, horizon);
        self.idle_power * horizon + (self.busy_power - self.idle_power) * busy_time
    }
}

impl EventHandler for DeviceNode {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            TupleArrived { tuple } => {
                self.route(tuple);
            }
            CompStarted { .. } => {}
            CompFinished { id, .. } => {
                self.on_finished(id);
            }
            CompFailed { id, .. } => {
                self.on_failed(id);
            }
        })
    }
}

/// Emits one tuple towards its gateway every `interval`.
struct SensorSource {
    template: Option<Tuple>,
    interval: f64,
    latency: f64,
    gateway: Id,
    ctx: SimulationContext,
}

impl SensorSource {
    fn new(model: &SensorModel, plan: &FlowPlan, ctx: SimulationContext) -> Self {
        let template = plan.application.sensor_edge(&model.tuple_type).map(|edge| Tuple {
            tuple_type: model.tuple_type.clone(),
            destination: edge.destination.clone(),
            direction: edge.direction,
            cpu_length: edge.cpu_length,
            nw_length: edge.nw_length,
            loop_id: model.loop_id,
            step: 1,
            origin: model.gateway,
            target: plan
                .target_device(&edge.destination, edge.direction, model.gateway, model.gateway)
                .unwrap_or(model.gateway),
            emitted_at: 0.0,
        });

        Self {
            template,
            interval: model.interval,
            latency: model.latency,
            gateway: plan.handlers[model.gateway],
            ctx,
        }
    }

    fn start(&mut self) {
        self.ctx.emit_self(SensorTick {}, self.interval);
    }

    fn emit(&mut self) {
        self.ctx.emit_self(SensorTick {}, self.interval);

        // The sensor hop only costs its fixed latency.
        if let Some(template) = &self.template {
            let tuple = Tuple { emitted_at: self.ctx.time(), ..template.clone() };
            self.ctx.emit(TupleArrived { tuple }, self.gateway, self.latency);
        }
    }
}

impl EventHandler for SensorSource {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            SensorTick {} => {
                self.emit();
            }
        })
    }
}

/// Engine moving tuples along the application loops on top of the
/// `dslab-core` event loop.
///
/// Every device is a `dslab-compute` multicore compute with one core per
/// processing element, fed from a FIFO, and has serialised up and down links.
/// Loop latency is measured from sensor emission to the end of processing at
/// the loop's last module.
#[derive(Debug, Default)]
pub struct TupleFlowEngine {
    entity_count: usize,
    devices: Vec<DeviceModel>,
    device_index: HashMap<DeviceName, usize>,
    sensors: Vec<SensorModel>,
    application: Option<Application>,
    placement: HashMap<ModuleName, Vec<usize>>,
}

impl TupleFlowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities declared by the last `init` call.
    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Devices `module` was submitted to, in mapping order.
    pub fn hosts_of(&self, module: &ModuleName) -> Vec<DeviceName> {
        self.placement
            .get(module)
            .map(|indices| indices.iter().map(|i| self.devices[*i].name.clone()).collect())
            .unwrap_or_default()
    }
}

impl SimulationEngine for TupleFlowEngine {
    fn init(&mut self, entity_count: usize) {
        *self = TupleFlowEngine { entity_count, ..TupleFlowEngine::default() };
    }

    fn register_devices(&mut self, topology: &Topology) -> Result<()> {
        for (_, device) in topology.devices() {
            if self.device_index.contains_key(&device.name) {
                return Err(Error::ModelConstructionError(format!("Device {} registered twice", device.name)));
            }
            self.device_index.insert(device.name.clone(), self.devices.len());
            self.devices.push(DeviceModel {
                name: device.name.clone(),
                parent: None,
                uplink_latency: device.uplink_latency.unwrap_or(0.0),
                uplink_bandwidth: device.uplink_bandwidth as f64,
                downlink_bandwidth: device.downlink_bandwidth as f64,
                pe_count: device.pe_count,
                pe_mips: device.pe_mips,
                ram: device.ram,
                busy_power: device.busy_power,
                idle_power: device.idle_power,
            });
        }

        for (_, device) in topology.devices() {
            let Some(parent_key) = device.parent else {
                continue;
            };
            let parent_name = topology
                .get(parent_key)
                .map(|p| p.name.clone())
                .ok_or_else(|| Error::UnknownDevice(format!("parent of {}", device.name)))?;
            let parent = self
                .device_index
                .get(&parent_name)
                .copied()
                .ok_or_else(|| Error::UnknownDevice(parent_name.to_string()))?;
            let child = self.device_index.get(&device.name).copied().ok_or_else(|| Error::UnknownDevice(device.name.to_string()))?;
            self.devices[child].parent = Some(parent);
        }

        Ok(())
    }

    fn register_sensors(&mut self, sensors: &[Sensor]) -> Result<()> {
        for sensor in sensors {
            let gateway = self
                .device_index
                .get(&sensor.gateway_name)
                .copied()
                .ok_or_else(|| Error::UnknownDevice(sensor.gateway_name.to_string()))?;
            if sensor.emission_interval() <= 0.0 {
                return Err(Error::ModelConstructionError(format!("Sensor {} needs a positive emission period", sensor.name)));
            }
            self.sensors.push(SensorModel {
                name: sensor.name.clone(),
                tuple_type: sensor.tuple_type.clone(),
                gateway,
                interval: sensor.emission_interval(),
                latency: sensor.latency,
                loop_id: None,
            });
        }
        Ok(())
    }

    fn submit_application(&mut self, app: &Application, mapping: &PlacementMapping) -> Result<()> {
        let mut placement: HashMap<ModuleName, Vec<usize>> = HashMap::new();
        for (module, devices) in mapping.entries() {
            if app.module(module).is_none() {
                return Err(Error::UnknownModule(module.to_string()));
            }
            let indices = devices
                .iter()
                .map(|name| self.device_index.get(name).copied().ok_or_else(|| Error::UnknownDevice(name.to_string())))
                .collect::<Result<Vec<usize>>>()?;
            placement.insert(module.clone(), indices);
        }

        for sensor in &mut self.sensors {
            sensor.loop_id = app.loops().iter().position(|l| l.sensor_tuple_type() == Some(&sensor.tuple_type));
        }

        self.placement = placement;
        self.application = Some(app.clone());
        Ok(())
    }

    fn run_until(&mut self, deadline: f64) -> RunOutcome {
        if self.devices.is_empty() {
            return RunOutcome::Failed("no devices registered".to_string());
        }
        if deadline <= 0.0 {
            return RunOutcome::Failed(format!("deadline {} is not positive", deadline));
        }
        let Some(app) = self.application.as_ref() else {
            return RunOutcome::Failed("no application submitted".to_string());
        };

        let mut sim = Simulation::new(SIMULATION_SEED);
        let output = rc!(refcell!(RunOutput::new()));

        let contexts: Vec<SimulationContext> = self.devices.iter().map(|d| sim.create_context(d.name.as_str())).collect();
        let plan = Rc::new(FlowPlan {
            application: app.clone(),
            placement: self.placement.clone(),
            parents: self.devices.iter().map(|d| d.parent).collect(),
            uplink_latencies: self.devices.iter().map(|d| d.uplink_latency).collect(),
            handlers: contexts.iter().map(|ctx| ctx.id()).collect(),
        });

        let mut nodes = Vec::with_capacity(self.devices.len());
        for (index, (device, ctx)) in self.devices.iter().zip(contexts).enumerate() {
            let compute_name = format!("{}::compute", device.name);
            let compute = rc!(refcell!(Compute::new(
                device.pe_mips as _,
                device.pe_count,
                device.ram,
                sim.create_context(&compute_name),
            )));
            sim.add_handler(compute_name, compute.clone());

            let node = rc!(refcell!(DeviceNode::new(index, device, plan.clone(), compute, output.clone(), deadline, ctx)));
            sim.add_handler(device.name.as_str(), node.clone());
            nodes.push(node);
        }

        for sensor in &self.sensors {
            let mut source = SensorSource::new(sensor, &plan, sim.create_context(sensor.name.as_str()));
            source.start();
            sim.add_handler(sensor.name.as_str(), rc!(refcell!(source)));
        }

        sim.step_for_duration(deadline);
        log::debug!("Engine stopped at {} after {} events.", sim.time(), sim.event_count());

        let mut result = output.borrow().clone();
        for node in &nodes {
            let node = node.borrow();
            result.set_device_energy(node.name.clone(), node.energy(deadline));
        }
        RunOutcome::Completed(result)
    }
}
