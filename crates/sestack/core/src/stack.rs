//! Protocol stack assembly and dispatch
//!
//! The stack owns its layers in an ordered list, bottom first. Operations are
//! dispatched to the top layer together with a [`Base`] handle covering the
//! layers beneath it, so each layer can only reach further down the chain.

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::layer::{LayerId, LayerState, Operation, ProtocolLayer};
use crate::property::{Property, PropertyId};
use crate::{Error, Result};

/// One layer of the stack together with its lifecycle state
#[derive(Debug)]
pub(crate) struct Slot {
    layer: Box<dyn ProtocolLayer>,
    state: LayerState,
}

/// Exclusive handle to the part of a chain beneath a layer
///
/// The bottom layer receives an empty base.
#[derive(Debug)]
pub struct Base<'a> {
    slots: &'a mut [Slot],
}

impl<'a> Base<'a> {
    pub(crate) const fn new(slots: &'a mut [Slot]) -> Self {
        Self { slots }
    }

    /// Check whether there is no layer beneath
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Identity of the layer directly beneath
    pub fn layer_id(&self) -> Option<LayerId> {
        self.slots.last().map(|slot| slot.layer.layer_id())
    }

    /// Activate the layer directly beneath, which activates its own base first
    ///
    /// Activating an empty base succeeds without a response.
    pub fn activate(&mut self) -> Result<Option<Bytes>> {
        let Some((top, below)) = self.slots.split_last_mut() else {
            return Ok(None);
        };
        let layer = top.layer.layer_id();
        if top.state != LayerState::Constructed {
            return Err(Error::InvalidState {
                layer,
                operation: Operation::Activate,
                state: top.state,
            });
        }

        match top.layer.activate(Base::new(below)) {
            Ok(response) => {
                top.state = LayerState::Activated;
                debug!(%layer, "Layer activated");
                Ok(response)
            }
            Err(e) => {
                debug!(%layer, error = ?e, "Layer activation failed");
                Err(e)
            }
        }
    }

    /// Hand `data` to the layer directly beneath
    pub fn transmit(&mut self, data: &[u8]) -> Result<()> {
        let (top, below) = self.split_activated(Operation::Transmit)?;
        let layer = top.layer.layer_id();
        trace!(%layer, data = %hex::encode(data), "Transmitting");

        let result = top.layer.transmit(data, Base::new(below));
        if let Err(e) = &result {
            debug!(%layer, error = ?e, "Transmit failed");
        }
        result
    }

    /// Obtain `expected_len` wire bytes through the layer directly beneath
    pub fn receive(&mut self, expected_len: usize) -> Result<Bytes> {
        let (top, below) = self.split_activated(Operation::Receive)?;
        let layer = top.layer.layer_id();

        let result = top.layer.receive(expected_len, Base::new(below));
        match &result {
            Ok(data) => trace!(%layer, data = %hex::encode(data), "Received"),
            Err(e) => debug!(%layer, error = ?e, "Receive failed"),
        }
        result
    }

    /// Read a property from the layer that owns it
    pub fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        self.owner_of(id, Operation::GetProperty)?
            .layer
            .get_property(id)
    }

    /// Write a property to the layer that owns it
    pub fn set_property(&mut self, property: Property) -> Result<()> {
        let slot = self.owner_of(property.id(), Operation::SetProperty)?;
        debug!(layer = %slot.layer.layer_id(), ?property, "Setting property");
        slot.layer.set_property(property)
    }

    fn split_activated(&mut self, operation: Operation) -> Result<(&mut Slot, &mut [Slot])> {
        let (top, below) = self
            .slots
            .split_last_mut()
            .ok_or_else(|| Error::invalid_stack(operation, "no layer beneath"))?;
        if top.state != LayerState::Activated {
            return Err(Error::InvalidState {
                layer: top.layer.layer_id(),
                operation,
                state: top.state,
            });
        }
        Ok((top, below))
    }

    /// Walk the chain top-down to the layer owning `id`
    fn owner_of(&mut self, id: PropertyId, operation: Operation) -> Result<&mut Slot> {
        let owner = id.owner();
        let slot = self
            .slots
            .iter_mut()
            .rev()
            .find(|slot| slot.layer.layer_id() == owner)
            .ok_or_else(|| {
                Error::invalid_stack(operation, "no layer in the chain owns the property")
            })?;
        match slot.state {
            LayerState::Constructed | LayerState::Activated => Ok(slot),
            state => Err(Error::InvalidState {
                layer: owner,
                operation,
                state,
            }),
        }
    }
}

/// An ordered chain of protocol layers with a transport layer at the bottom
///
/// The stack is torn down exactly once, either by an explicit
/// [`ProtocolStack::destroy`] or when it is dropped.
#[derive(Debug)]
pub struct ProtocolStack {
    /// Layers, bottom first
    slots: Vec<Slot>,
}

impl ProtocolStack {
    /// Create a stack with `transport` as its bottom layer
    pub fn new<L: ProtocolLayer + 'static>(transport: L) -> Result<Self> {
        Self::from_boxed(Box::new(transport))
    }

    /// Create a stack from an already boxed bottom layer
    pub fn from_boxed(mut transport: Box<dyn ProtocolLayer>) -> Result<Self> {
        if transport.requires_base() {
            transport.destroy();
            return Err(Error::invalid_stack(
                Operation::Initialize,
                "bottom layer requires a base",
            ));
        }
        debug!(layer = %transport.layer_id(), "Created protocol stack");
        Ok(Self {
            slots: vec![Slot {
                layer: transport,
                state: LayerState::Constructed,
            }],
        })
    }

    /// Push `layer` on top of the stack
    pub fn push<L: ProtocolLayer + 'static>(&mut self, layer: L) -> Result<()> {
        self.push_boxed(Box::new(layer))
    }

    /// Push `layer` on top of the stack and return the stack
    pub fn with_layer<L: ProtocolLayer + 'static>(mut self, layer: L) -> Result<Self> {
        self.push(layer)?;
        Ok(self)
    }

    /// Push an already boxed layer on top of the stack
    ///
    /// A rejected layer is destroyed before the error is returned.
    pub fn push_boxed(&mut self, mut layer: Box<dyn ProtocolLayer>) -> Result<()> {
        if let Err(e) = self.check_attach(layer.as_ref()) {
            layer.destroy();
            return Err(e);
        }
        debug!(layer = %layer.layer_id(), depth = self.slots.len(), "Pushed layer");
        self.slots.push(Slot {
            layer,
            state: LayerState::Constructed,
        });
        Ok(())
    }

    fn check_attach(&self, layer: &dyn ProtocolLayer) -> Result<()> {
        let id = layer.layer_id();
        let state = self.state();
        if state != LayerState::Constructed {
            return Err(Error::InvalidState {
                layer: id,
                operation: Operation::Initialize,
                state,
            });
        }
        if self.contains(id) {
            return Err(Error::invalid_stack(
                Operation::Initialize,
                "layer id already present in the chain",
            ));
        }
        Ok(())
    }

    /// Number of layers in the stack
    pub const fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Layer ids, bottom first
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.slots.iter().map(|slot| slot.layer.layer_id())
    }

    /// Check whether a layer with `id` is part of the chain
    pub fn contains(&self, id: LayerId) -> bool {
        self.layer_ids().any(|layer| layer == id)
    }

    /// State of the top layer
    pub fn state(&self) -> LayerState {
        self.slots
            .last()
            .map_or(LayerState::Destroyed, |slot| slot.state)
    }

    /// State of the layer with `id`
    pub fn layer_state(&self, id: LayerId) -> Option<LayerState> {
        self.slots
            .iter()
            .find(|slot| slot.layer.layer_id() == id)
            .map(|slot| slot.state)
    }

    fn base(&mut self) -> Base<'_> {
        Base::new(&mut self.slots)
    }

    /// Activate the whole chain, top layer first
    #[instrument(level = "debug", skip(self), fields(depth = self.slots.len()))]
    pub fn activate(&mut self) -> Result<Option<Bytes>> {
        self.base().activate()
    }

    /// Transmit `data` through the top layer
    pub fn transmit(&mut self, data: &[u8]) -> Result<()> {
        self.base().transmit(data)
    }

    /// Receive `expected_len` wire bytes through the top layer
    pub fn receive(&mut self, expected_len: usize) -> Result<Bytes> {
        self.base().receive(expected_len)
    }

    /// Read a property from the layer that owns it
    pub fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        self.base().get_property(id)
    }

    /// Write a property to the layer that owns it
    pub fn set_property(&mut self, property: Property) -> Result<()> {
        self.base().set_property(property)
    }

    /// Peer address on the bus
    pub fn slave_address(&mut self) -> Result<u16> {
        match self.get_property(PropertyId::SlaveAddress)? {
            Property::SlaveAddress(address) => Ok(address),
            _ => Err(Error::invalid_stack(
                Operation::GetProperty,
                "owner returned a different property",
            )),
        }
    }

    /// Set the peer address on the bus
    pub fn set_slave_address(&mut self, address: u16) -> Result<()> {
        self.set_property(Property::SlaveAddress(address))
    }

    /// Bus clock frequency in Hz
    pub fn clock_frequency(&mut self) -> Result<u32> {
        match self.get_property(PropertyId::ClockFrequency)? {
            Property::ClockFrequency(frequency) => Ok(frequency),
            _ => Err(Error::invalid_stack(
                Operation::GetProperty,
                "owner returned a different property",
            )),
        }
    }

    /// Set the bus clock frequency in Hz
    pub fn set_clock_frequency(&mut self, frequency: u32) -> Result<()> {
        self.set_property(Property::ClockFrequency(frequency))
    }

    /// Tear down every layer, top first
    ///
    /// Layers already destroyed are skipped, so calling this again is a no-op.
    pub fn destroy(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            if slot.state == LayerState::Destroyed {
                continue;
            }
            debug!(layer = %slot.layer.layer_id(), "Destroying layer");
            slot.layer.destroy();
            slot.state = LayerState::Destroyed;
        }
    }
}

impl Drop for ProtocolStack {
    fn drop(&mut self) {
        self.destroy();
    }
}
