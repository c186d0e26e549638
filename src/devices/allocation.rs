use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::{available_channels, is_complete, Device, DeviceId, DeviceKind, SlotShape};
use crate::Channel;

/// Errors raised when editing an allocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("no device {0}")]
    UnknownDevice(DeviceId),
    #[error("{kind} has no slot named `{slot}`")]
    UnknownSlot { kind: DeviceKind, slot: String },
    #[error("channel {channel} is already claimed by device {device} slot `{slot}`")]
    ChannelClaimed {
        channel: Channel,
        device: DeviceId,
        slot: &'static str,
    },
    #[error("device {device} slot `{slot}` already holds channel {channel}")]
    SlotOccupied {
        device: DeviceId,
        slot: &'static str,
        channel: Channel,
    },
}

/// Declared devices plus the reverse index from channel to owning slot.
///
/// Every edit goes through here so a channel never sits in two slots.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    devices: Vec<Device>,
    owners: HashMap<Channel, (DeviceId, &'static str)>,
    next_id: u32,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a device with all slots empty
    pub fn add_device(&mut self, kind: DeviceKind) -> DeviceId {
        let id = DeviceId(self.next_id);
        self.next_id += 1;
        self.devices.push(Device::new(id, kind));
        debug!(device = %id, %kind, "device declared");
        id
    }

    /// Declare a device and let [`Allocation::suggest`] fill it from `all`.
    ///
    /// A device with no usable suggestion is still declared, empty. If
    /// filling it fails the device is removed again and the error returned.
    pub fn add_suggested(
        &mut self,
        kind: DeviceKind,
        all: &BTreeSet<Channel>,
    ) -> Result<DeviceId, AllocationError> {
        let id = self.add_device(kind);
        if let Err(err) = self.suggest(id, all) {
            self.remove_device(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Remove a device, releasing every channel it held
    pub fn remove_device(&mut self, id: DeviceId) -> Option<Device> {
        let idx = self.devices.iter().position(|d| d.id == id)?;
        let device = self.devices.remove(idx);
        for channel in device.claimed_channels() {
            self.owners.remove(&channel);
        }
        debug!(device = %id, "device removed");
        Some(device)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Which device slot holds `channel`
    pub fn owner_of(&self, channel: Channel) -> Option<(DeviceId, &'static str)> {
        self.owners.get(&channel).copied()
    }

    /// Bind `channel` to a device slot.
    ///
    /// Re-assigning the same channel to the same slot is a no-op. A channel
    /// held elsewhere, or a slot holding a different channel, is rejected:
    /// vacate first.
    pub fn assign(&mut self, id: DeviceId, slot: &str, channel: Channel) -> Result<(), AllocationError> {
        let owner = self.owner_of(channel);
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(AllocationError::UnknownDevice(id))?;
        let kind = device.kind;
        let target = device
            .slot_mut(slot)
            .ok_or_else(|| AllocationError::UnknownSlot {
                kind,
                slot: slot.to_string(),
            })?;

        match target.channel {
            Some(held) if held == channel => return Ok(()),
            Some(held) => {
                return Err(AllocationError::SlotOccupied {
                    device: id,
                    slot: target.name,
                    channel: held,
                })
            }
            None => {}
        }

        if let Some((device, slot)) = owner {
            return Err(AllocationError::ChannelClaimed {
                channel,
                device,
                slot,
            });
        }

        target.channel = Some(channel);
        let name = target.name;
        self.owners.insert(channel, (id, name));
        debug!(device = %id, slot = name, channel, "channel claimed");
        Ok(())
    }

    /// Empty a slot, returning the channel it held
    pub fn vacate(&mut self, id: DeviceId, slot: &str) -> Result<Option<Channel>, AllocationError> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(AllocationError::UnknownDevice(id))?;
        let kind = device.kind;
        let target = device
            .slot_mut(slot)
            .ok_or_else(|| AllocationError::UnknownSlot {
                kind,
                slot: slot.to_string(),
            })?;

        let released = target.channel.take();
        if let Some(channel) = released {
            self.owners.remove(&channel);
            debug!(device = %id, slot, channel, "channel released");
        }
        Ok(released)
    }

    /// Channels of `all` not held by any slot
    pub fn available_channels(&self, all: &BTreeSet<Channel>) -> BTreeSet<Channel> {
        available_channels(&self.devices, all)
    }

    /// Every channel of `all` is held by some slot
    pub fn is_complete(&self, all: &BTreeSet<Channel>) -> bool {
        is_complete(&self.devices, all)
    }

    /// Best-effort pre-fill of an empty device from the available channels.
    ///
    /// - a kind with a standard wiring is filled only if all of it is
    ///   referenced and unclaimed; a partial match touches nothing
    /// - a single-slot device takes the lowest available channel
    /// - dual-slot devices are never guessed
    ///
    /// Returns whether anything was filled.
    pub fn suggest(&mut self, id: DeviceId, all: &BTreeSet<Channel>) -> Result<bool, AllocationError> {
        let device = self.device(id).ok_or(AllocationError::UnknownDevice(id))?;
        if device.claimed_channels().next().is_some() {
            return Ok(false);
        }
        let kind = device.kind;
        let available = self.available_channels(all);

        if let Some(wiring) = kind.standard_wiring() {
            if !wiring.iter().all(|ch| available.contains(ch)) {
                return Ok(false);
            }
            for (&slot, &channel) in kind.slot_names().iter().zip(wiring) {
                self.assign(id, slot, channel)?;
            }
            debug!(device = %id, %kind, "standard wiring applied");
            return Ok(true);
        }

        match (kind.shape(), available.first()) {
            (SlotShape::Single, Some(&channel)) => {
                self.assign(id, kind.slot_names()[0], channel)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Carry the allocation into a new run: vacate slots whose channel the
    /// run no longer references. Returns the released channels.
    pub fn retain_valid(&mut self, all: &BTreeSet<Channel>) -> Vec<Channel> {
        let mut released = Vec::new();
        for device in &mut self.devices {
            for slot in &mut device.slots {
                if let Some(channel) = slot.channel {
                    if !all.contains(&channel) {
                        slot.channel = None;
                        self.owners.remove(&channel);
                        released.push(channel);
                    }
                }
            }
        }
        if !released.is_empty() {
            debug!(?released, "stale channel claims dropped");
        }
        released
    }
}
