// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spike train storage
//!
//! Decoders push `(address, time)` pairs into a [`SpikeSink`]. Two stores keep
//! the complete result:
//! - [`DenseSpikeTrains`]: one `Vec` per address, allocated up front
//! - [`SparseSpikeTrains`]: only addresses that fired, keyed in an `AHashMap`
//!
//! Both answer lookups the same way: an address that never fired has an empty
//! train. [`FnSink`] forwards spikes to a callback instead of storing them.

use ahash::AHashMap;
pub use pfspinn_config::MAX_DENSE_ADDRESS_BITS;

use crate::error::{EventLogError, Result};

/// Receiver for decoded spikes, called in log order
pub trait SpikeSink {
    fn push_spike(&mut self, address: u32, time: f64);
}

/// A sink that keeps every spike train for later lookup
pub trait SpikeTrainStore: SpikeSink + Sized {
    /// Create an empty store covering `[0, address_space)`
    fn with_address_space(address_space: u64) -> Result<Self>;

    /// Ordered spike times for `address`; empty if it never fired
    fn spike_train(&self, address: u32) -> &[f64];

    fn address_space(&self) -> u64;

    /// Total number of spikes across all addresses
    fn total_spikes(&self) -> usize;

    /// Number of addresses with at least one spike
    fn active_addresses(&self) -> usize;
}

/// Dense table of spike trains indexed by address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenseSpikeTrains {
    trains: Vec<Vec<f64>>,
}

impl DenseSpikeTrains {
    pub fn new(address_space: usize) -> Self {
        Self {
            trains: vec![Vec::new(); address_space],
        }
    }

    pub fn len(&self) -> usize {
        self.trains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// All trains in address order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[f64])> + '_ {
        self.trains
            .iter()
            .enumerate()
            .map(|(address, train)| (address as u32, train.as_slice()))
    }

    /// Addresses that fired, in address order
    pub fn iter_active(&self) -> impl Iterator<Item = (u32, &[f64])> + '_ {
        self.iter().filter(|(_, train)| !train.is_empty())
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.trains
    }
}

impl SpikeSink for DenseSpikeTrains {
    #[inline]
    fn push_spike(&mut self, address: u32, time: f64) {
        if let Some(train) = self.trains.get_mut(address as usize) {
            train.push(time);
        }
    }
}

impl SpikeTrainStore for DenseSpikeTrains {
    fn with_address_space(address_space: u64) -> Result<Self> {
        if address_space > 1u64 << MAX_DENSE_ADDRESS_BITS {
            return Err(EventLogError::InvalidConfig(format!(
                "dense spike train table of {} slots exceeds 2^{}; use the sparse store",
                address_space, MAX_DENSE_ADDRESS_BITS
            )));
        }
        Ok(Self::new(address_space as usize))
    }

    fn spike_train(&self, address: u32) -> &[f64] {
        self.trains
            .get(address as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn address_space(&self) -> u64 {
        self.trains.len() as u64
    }

    fn total_spikes(&self) -> usize {
        self.trains.iter().map(Vec::len).sum()
    }

    fn active_addresses(&self) -> usize {
        self.trains.iter().filter(|train| !train.is_empty()).count()
    }
}

/// Spike trains for addresses that fired only
#[derive(Debug, Clone, Default)]
pub struct SparseSpikeTrains {
    trains: AHashMap<u32, Vec<f64>>,
    address_space: u64,
}

impl SparseSpikeTrains {
    pub fn new(address_space: u64) -> Self {
        Self {
            trains: AHashMap::new(),
            address_space,
        }
    }

    /// Active addresses in ascending order
    pub fn iter_sorted(&self) -> impl Iterator<Item = (u32, &[f64])> + '_ {
        let mut addresses: Vec<u32> = self.trains.keys().copied().collect();
        addresses.sort_unstable();
        addresses
            .into_iter()
            .map(move |address| (address, self.spike_train(address)))
    }

    /// Expand into a dense table of the same address space
    pub fn to_dense(&self) -> Result<DenseSpikeTrains> {
        let mut dense = DenseSpikeTrains::with_address_space(self.address_space)?;
        for (address, train) in &self.trains {
            if let Some(slot) = dense.trains.get_mut(*address as usize) {
                slot.extend_from_slice(train);
            }
        }
        Ok(dense)
    }
}

impl SpikeSink for SparseSpikeTrains {
    #[inline]
    fn push_spike(&mut self, address: u32, time: f64) {
        if u64::from(address) < self.address_space {
            self.trains.entry(address).or_default().push(time);
        }
    }
}

impl SpikeTrainStore for SparseSpikeTrains {
    fn with_address_space(address_space: u64) -> Result<Self> {
        Ok(Self::new(address_space))
    }

    fn spike_train(&self, address: u32) -> &[f64] {
        self.trains
            .get(&address)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn address_space(&self) -> u64 {
        self.address_space
    }

    fn total_spikes(&self) -> usize {
        self.trains.values().map(Vec::len).sum()
    }

    fn active_addresses(&self) -> usize {
        self.trains.len()
    }
}

/// Adapter that hands each spike to a callback
///
/// ```
/// use pfspinn_event_log::{FnSink, SpikeSink};
///
/// let mut seen = Vec::new();
/// let mut sink = FnSink(|address: u32, time: f64| seen.push((address, time)));
/// sink.push_spike(3, 0.5);
/// drop(sink);
/// assert_eq!(seen, vec![(3, 0.5)]);
/// ```
pub struct FnSink<F>(pub F);

impl<F> SpikeSink for FnSink<F>
where
    F: FnMut(u32, f64),
{
    #[inline]
    fn push_spike(&mut self, address: u32, time: f64) {
        (self.0)(address, time)
    }
}
