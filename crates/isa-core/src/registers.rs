//! Register file constants and validated sampling ranges.

use rand::Rng;

use crate::error::ConfigError;

/// Number of integer registers in RV32I.
pub const REGISTER_COUNT: usize = 32;

/// The hardwired zero register, x0.
pub const ZERO: u8 = 0;
/// Return address register, x1 (ra).
pub const RA: u8 = 1;
/// Stack pointer register, x2 (sp).
pub const SP: u8 = 2;
/// Frame pointer / first saved register, x8 (s0).
pub const S0: u8 = 8;

const ABI_NAMES: [&str; REGISTER_COUNT] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// ABI name of a register number; the number is masked to x0..x31.
#[must_use]
pub const fn abi_name(reg: u8) -> &'static str {
    ABI_NAMES[(reg & 0x1F) as usize]
}

/// A validated inclusive sub-range of x0..x31 used for operand sampling.
///
/// Zero exclusion is part of the range's configuration: a range that could
/// only ever produce x0 is rejected when the exclusion is requested, so the
/// sampling loop always terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterRange {
    min: u8,
    max: u8,
    exclude_zero: bool,
}

impl RegisterRange {
    /// The full architectural range x0..=x31.
    pub const FULL: Self = Self {
        min: 0,
        max: 31,
        exclude_zero: false,
    };

    /// The writable range x1..=x31.
    pub const NONZERO: Self = Self {
        min: 1,
        max: 31,
        exclude_zero: false,
    };

    /// Builds a range after validating `min <= max <= 31`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegisterRange`] for inverted or
    /// out-of-file bounds.
    pub const fn new(min: u8, max: u8) -> Result<Self, ConfigError> {
        if min > max || max > 31 {
            return Err(ConfigError::InvalidRegisterRange { min, max });
        }
        Ok(Self {
            min,
            max,
            exclude_zero: false,
        })
    }

    /// Marks the range as never producing x0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroOnlyRange`] when the range contains no
    /// register other than x0, which would make sampling impossible.
    pub const fn excluding_zero(self) -> Result<Self, ConfigError> {
        if self.max == 0 {
            return Err(ConfigError::ZeroOnlyRange);
        }
        Ok(Self {
            exclude_zero: true,
            ..self
        })
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(self) -> u8 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(self) -> u8 {
        self.max
    }

    /// Whether x0 is withheld from sampling.
    #[must_use]
    pub const fn excludes_zero(self) -> bool {
        self.exclude_zero
    }

    /// Whether `reg` can be produced by [`RegisterRange::sample`].
    #[must_use]
    pub const fn contains(self, reg: u8) -> bool {
        reg >= self.min && reg <= self.max && !(self.exclude_zero && reg == 0)
    }

    /// Draws a uniform register from the range.
    ///
    /// With zero exclusion the draw repeats until a nonzero register comes
    /// up; construction guarantees one exists.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        loop {
            let reg = rng.gen_range(self.min..=self.max);
            if !(self.exclude_zero && reg == 0) {
                return reg;
            }
        }
    }
}

impl Default for RegisterRange {
    fn default() -> Self {
        Self::FULL
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::{abi_name, RegisterRange, ZERO};
    use crate::error::ConfigError;

    #[test]
    fn rejects_inverted_and_oversized_bounds() {
        assert_eq!(
            RegisterRange::new(9, 3),
            Err(ConfigError::InvalidRegisterRange { min: 9, max: 3 })
        );
        assert_eq!(
            RegisterRange::new(0, 32),
            Err(ConfigError::InvalidRegisterRange { min: 0, max: 32 })
        );
    }

    #[test]
    fn zero_only_range_cannot_exclude_zero() {
        let range = RegisterRange::new(0, 0).unwrap();
        assert_eq!(range.excluding_zero(), Err(ConfigError::ZeroOnlyRange));
    }

    #[test]
    fn exclusion_is_validated_before_any_sampling_happens() {
        // The error surfaces from the constructor call alone; no RNG is
        // involved.
        let result = RegisterRange::new(0, 0).and_then(RegisterRange::excluding_zero);
        assert_eq!(result, Err(ConfigError::ZeroOnlyRange));
    }

    #[test]
    fn samples_stay_inside_the_configured_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let range = RegisterRange::new(5, 9).unwrap();
        for _ in 0..200 {
            let reg = range.sample(&mut rng);
            assert!((5..=9).contains(&reg));
        }
    }

    #[test]
    fn excluded_zero_never_appears() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let range = RegisterRange::new(0, 2).unwrap().excluding_zero().unwrap();
        for _ in 0..500 {
            assert_ne!(range.sample(&mut rng), ZERO);
        }
    }

    #[test]
    fn contains_reflects_bounds_and_exclusion() {
        let range = RegisterRange::new(0, 4).unwrap().excluding_zero().unwrap();
        assert!(!range.contains(0));
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn abi_names_cover_the_register_file() {
        assert_eq!(abi_name(0), "zero");
        assert_eq!(abi_name(2), "sp");
        assert_eq!(abi_name(8), "s0");
        assert_eq!(abi_name(31), "t6");
        assert_eq!(abi_name(32), "zero");
    }
}
