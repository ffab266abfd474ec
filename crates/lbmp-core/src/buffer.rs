// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Bounded FIFO of the most recent hourly values

use crate::topology::HOURS_PER_DAY;
use ringbuffer::{AllocRingBuffer, RingBuffer};
use std::fmt;

/// Holds the latest per-location values so a missing DST hour can be replayed.
///
/// Capacity is fixed at 24; once full, pushing evicts the oldest value.
pub struct SlidingHourBuffer {
    values: AllocRingBuffer<String>,
}

impl fmt::Debug for SlidingHourBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl Default for SlidingHourBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingHourBuffer {
    pub const CAPACITY: usize = HOURS_PER_DAY;

    pub fn new() -> Self {
        Self {
            values: AllocRingBuffer::new(Self::CAPACITY),
        }
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    /// Stored values, oldest first
    pub fn snapshot_all(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.is_full()
    }
}
