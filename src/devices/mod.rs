//! Device allocation - binding referenced channels to declared devices
//!
//! Each device kind has a fixed set of named slots. A run may only be
//! played back once every channel its log references sits in exactly one
//! slot of one device. [`Allocation`] keeps the channel-to-slot mapping a
//! bijection; [`available_channels`] and [`is_complete`] answer the two
//! questions the caller gates playback on.

mod allocation;
mod kind;

use std::collections::BTreeSet;
use std::fmt;

use crate::Channel;

pub use allocation::{Allocation, AllocationError};
pub use kind::{DeviceKind, SlotShape, UnknownKind, SEVEN_SEGMENT_STANDARD_WIRING};

/// Opaque handle for a declared device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named role within a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub channel: Option<Channel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    kind: DeviceKind,
    slots: Vec<Slot>,
}

impl Device {
    fn new(id: DeviceId, kind: DeviceKind) -> Self {
        let slots = kind
            .slot_names()
            .iter()
            .map(|&name| Slot {
                name,
                channel: None,
            })
            .collect();
        Self { id, kind, slots }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Channel bound to `slot`, if the slot exists and is filled
    pub fn channel(&self, slot: &str) -> Option<Channel> {
        self.slots
            .iter()
            .find(|s| s.name == slot)
            .and_then(|s| s.channel)
    }

    /// Every slot filled
    pub fn is_wired(&self) -> bool {
        self.slots.iter().all(|s| s.channel.is_some())
    }

    pub fn claimed_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.slots.iter().filter_map(|s| s.channel)
    }

    fn slot_mut(&mut self, slot: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.name == slot)
    }
}

fn claimed(devices: &[Device]) -> BTreeSet<Channel> {
    devices.iter().flat_map(Device::claimed_channels).collect()
}

/// Channels in `all` that no filled slot holds yet
pub fn available_channels(devices: &[Device], all: &BTreeSet<Channel>) -> BTreeSet<Channel> {
    let claimed = claimed(devices);
    all.difference(&claimed).copied().collect()
}

/// True when every channel in `all` sits in some filled slot.
///
/// Empty or extra slots don't matter; only the referenced channels do.
pub fn is_complete(devices: &[Device], all: &BTreeSet<Channel>) -> bool {
    let claimed = claimed(devices);
    all.is_subset(&claimed)
}
