// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Caller-owned point cloud container.
//!
//! Structure-of-arrays layout with a pre-allocated capacity: the decoder
//! appends into a `Points` owned by the caller, who clears it between
//! frames. No allocations occur during steady-state operation.

/// Pre-allocated point cloud buffer.
#[derive(Clone, Debug)]
pub struct Points {
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    intensity: Vec<u8>,
    len: usize,
}

impl Points {
    /// Create a buffer able to hold `capacity` points. Memory is
    /// allocated once here.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            z: vec![0.0; capacity],
            intensity: vec![0; capacity],
            len: 0,
        }
    }

    /// Number of valid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of points the buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.x.len()
    }

    /// Reset length to zero. Does not zero the underlying memory and does
    /// not release capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one point.
    ///
    /// Panics in debug builds when the buffer is full; in release builds
    /// points beyond capacity are silently dropped.
    #[inline]
    pub fn push(&mut self, x: f32, y: f32, z: f32, intensity: u8) {
        debug_assert!(
            self.len < self.capacity(),
            "Points overflow: {} >= {}",
            self.len,
            self.capacity()
        );

        if self.len < self.capacity() {
            self.x[self.len] = x;
            self.y[self.len] = y;
            self.z[self.len] = z;
            self.intensity[self.len] = intensity;
            self.len += 1;
        }
    }

    /// Valid X coordinates.
    #[inline]
    pub fn x(&self) -> &[f32] {
        &self.x[..self.len]
    }

    /// Valid Y coordinates.
    #[inline]
    pub fn y(&self) -> &[f32] {
        &self.y[..self.len]
    }

    /// Valid Z coordinates.
    #[inline]
    pub fn z(&self) -> &[f32] {
        &self.z[..self.len]
    }

    /// Valid intensity values.
    #[inline]
    pub fn intensity(&self) -> &[u8] {
        &self.intensity[..self.len]
    }
}

impl Default for Points {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_slices() {
        let mut points = Points::with_capacity(100);
        assert_eq!(points.len(), 0);
        assert!(points.is_empty());
        assert_eq!(points.capacity(), 100);

        points.push(1.0, 2.0, 3.0, 128);
        points.push(4.0, 5.0, 6.0, 255);
        assert_eq!(points.len(), 2);
        assert_eq!(points.x(), &[1.0, 4.0]);
        assert_eq!(points.y(), &[2.0, 5.0]);
        assert_eq!(points.z(), &[3.0, 6.0]);
        assert_eq!(points.intensity(), &[128, 255]);
    }

    #[test]
    fn test_clear_retains_capacity() {
        let mut points = Points::with_capacity(10);
        points.push(1.0, 1.0, 1.0, 1);
        points.clear();
        assert!(points.is_empty());
        assert_eq!(points.capacity(), 10);
    }

    #[test]
    #[cfg_attr(debug_assertions, ignore)]
    fn test_overflow_ignored_in_release() {
        let mut points = Points::with_capacity(1);
        points.push(1.0, 1.0, 1.0, 1);
        points.push(2.0, 2.0, 2.0, 2);
        assert_eq!(points.len(), 1);
        assert_eq!(points.x(), &[1.0]);
    }
}
