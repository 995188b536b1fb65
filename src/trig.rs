// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Precomputed cosine/sine table over the fixed-point angle domain.
//!
//! Angles throughout the decoder are integer hundredths of a degree in
//! `[0, 36000)`, so a table computed once at startup makes every
//! projection lookup exact and branch-free. The table is read-only after
//! construction and safe to share between decoder instances.

use crate::packet::ROTATION_MAX;

pub struct TrigTable {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl TrigTable {
    /// Precompute cos/sin for every representable hundredth of a degree.
    pub fn new() -> Self {
        let mut cos = Vec::with_capacity(ROTATION_MAX as usize);
        let mut sin = Vec::with_capacity(ROTATION_MAX as usize);
        for i in 0..ROTATION_MAX {
            let radians = (i as f64 * 0.01).to_radians();
            cos.push(radians.cos());
            sin.push(radians.sin());
        }
        Self { cos, sin }
    }

    /// Look up `(cos, sin)` for an angle in hundredths of a degree.
    ///
    /// The angle must already be reduced into `[0, ROTATION_MAX)`.
    #[inline]
    pub fn lookup(&self, angle: u16) -> (f64, f64) {
        debug_assert!(angle < ROTATION_MAX);
        (self.cos[angle as usize], self.sin[angle as usize])
    }
}

impl Default for TrigTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_angles() {
        let table = TrigTable::new();

        let (cos, sin) = table.lookup(0);
        assert_eq!(cos, 1.0);
        assert_eq!(sin, 0.0);

        let (cos, sin) = table.lookup(9000);
        assert!(cos.abs() < 1e-12);
        assert!((sin - 1.0).abs() < 1e-12);

        let (cos, sin) = table.lookup(18000);
        assert!((cos + 1.0).abs() < 1e-12);
        assert!(sin.abs() < 1e-12);

        let (cos, sin) = table.lookup(27000);
        assert!(cos.abs() < 1e-12);
        assert!((sin + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matches_direct_computation() {
        let table = TrigTable::new();
        for angle in [1u16, 4500, 12345, 35999] {
            let radians = (angle as f64 * 0.01).to_radians();
            let (cos, sin) = table.lookup(angle);
            assert_eq!(cos, radians.cos());
            assert_eq!(sin, radians.sin());
        }
    }
}
