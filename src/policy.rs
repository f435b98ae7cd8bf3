use crate::error::PolicyError;

/// Slot count of a freshly created table under the default policy.
pub const DEFAULT_MIN_CAPACITY: usize = 32;

/// Default load above which an insert grows the table.
pub const DEFAULT_MAX_LOAD: f64 = 0.6;

/// Default load below which a removal shrinks the table.
pub const DEFAULT_MIN_LOAD: f64 = 0.125;

/// Sizing thresholds for a [`HashTable`](crate::HashTable).
///
/// Load is measured as `(occupied + tombstones) / capacity`. Inserting grows
/// the table while the load would exceed `max_load`; removing halves it when
/// the load falls below `min_load` and the capacity is above
/// `min_capacity`.
///
/// # Examples
///
/// ```rust
/// use linear_hash::LoadPolicy;
///
/// let policy = LoadPolicy::new(64, 0.5, 0.1).unwrap();
/// assert_eq!(policy.min_capacity(), 64);
///
/// // Thresholds that would let the table fill completely are rejected.
/// assert!(LoadPolicy::new(64, 1.0, 0.1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPolicy {
    min_capacity: usize,
    max_load: f64,
    min_load: f64,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            min_capacity: DEFAULT_MIN_CAPACITY,
            max_load: DEFAULT_MAX_LOAD,
            min_load: DEFAULT_MIN_LOAD,
        }
    }
}

impl LoadPolicy {
    /// Creates a policy, rounding `min_capacity` up to a power of two.
    ///
    /// `max_load` must lie in `(0, 1)` so a table never saturates, and must
    /// let a table at `min_capacity` hold at least one entry. `min_load` must
    /// be at most half of `max_load` so a grow is never immediately undone
    /// by a shrink (and vice versa).
    pub fn new(min_capacity: usize, max_load: f64, min_load: f64) -> Result<Self, PolicyError> {
        let min_capacity = match min_capacity {
            0 => return Err(PolicyError::MinCapacity(min_capacity)),
            n => n
                .checked_next_power_of_two()
                .ok_or(PolicyError::MinCapacity(n))?,
        };

        if !(max_load > 0.0 && max_load < 1.0) {
            return Err(PolicyError::MaxLoad(max_load));
        }

        if max_load * (min_capacity as f64) < 1.0 {
            return Err(PolicyError::Unfillable {
                max_load,
                min_capacity,
            });
        }

        if !(min_load >= 0.0 && min_load * 2.0 <= max_load) {
            return Err(PolicyError::MinLoad {
                min: min_load,
                max: max_load,
            });
        }

        Ok(Self {
            min_capacity,
            max_load,
            min_load,
        })
    }

    /// The smallest capacity a table under this policy will shrink to.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// The load above which inserts grow the table.
    pub fn max_load(&self) -> f64 {
        self.max_load
    }

    /// The load below which removals shrink the table.
    pub fn min_load(&self) -> f64 {
        self.min_load
    }

    #[inline]
    pub(crate) fn exceeds_max(&self, used: usize, capacity: usize) -> bool {
        used as f64 / capacity as f64 > self.max_load
    }

    #[inline]
    pub(crate) fn below_min(&self, used: usize, capacity: usize) -> bool {
        capacity > self.min_capacity && (used as f64 / capacity as f64) < self.min_load
    }

    /// Smallest admissible capacity holding `len` entries without exceeding
    /// the max load, or `None` on overflow.
    pub(crate) fn capacity_for(&self, len: usize) -> Option<usize> {
        let mut capacity = self.min_capacity;
        while self.exceeds_max(len, capacity) {
            capacity = capacity.checked_mul(2)?;
        }
        Some(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let policy = LoadPolicy::default();
        assert_eq!(policy.min_capacity(), 32);
        assert_eq!(policy.max_load(), 0.6);
        assert_eq!(policy.min_load(), 0.125);

        // 19 / 32 = 0.59375, 20 / 32 = 0.625
        assert!(!policy.exceeds_max(19, 32));
        assert!(policy.exceeds_max(20, 32));

        // Never shrink at the minimum capacity.
        assert!(!policy.below_min(0, 32));
        assert!(policy.below_min(7, 64));
        assert!(!policy.below_min(8, 64));
    }

    #[test]
    fn min_capacity_is_rounded() {
        let policy = LoadPolicy::new(100, 0.6, 0.125).unwrap();
        assert_eq!(policy.min_capacity(), 128);

        assert_eq!(
            LoadPolicy::new(0, 0.6, 0.125),
            Err(PolicyError::MinCapacity(0))
        );
        assert_eq!(
            LoadPolicy::new(usize::MAX, 0.6, 0.125),
            Err(PolicyError::MinCapacity(usize::MAX))
        );
    }

    #[test]
    fn rejects_saturating_or_oscillating_loads() {
        assert!(matches!(
            LoadPolicy::new(32, 0.0, 0.0),
            Err(PolicyError::MaxLoad(_))
        ));
        assert!(matches!(
            LoadPolicy::new(32, 1.0, 0.1),
            Err(PolicyError::MaxLoad(_))
        ));
        assert!(matches!(
            LoadPolicy::new(32, f64::NAN, 0.1),
            Err(PolicyError::MaxLoad(_))
        ));
        assert!(matches!(
            LoadPolicy::new(32, 0.6, 0.4),
            Err(PolicyError::MinLoad { .. })
        ));
        assert!(matches!(
            LoadPolicy::new(32, 0.6, -0.1),
            Err(PolicyError::MinLoad { .. })
        ));
        assert!(LoadPolicy::new(32, 0.6, 0.3).is_ok());
    }

    #[test]
    fn rejects_loads_too_small_for_one_entry() {
        assert_eq!(
            LoadPolicy::new(32, 1e-300, 0.0),
            Err(PolicyError::Unfillable {
                max_load: 1e-300,
                min_capacity: 32
            })
        );
        assert!(matches!(
            LoadPolicy::new(4, 0.2, 0.1),
            Err(PolicyError::Unfillable { .. })
        ));

        // One entry per minimum-size table is enough.
        let policy = LoadPolicy::new(4, 0.25, 0.1).unwrap();
        assert_eq!(policy.capacity_for(1), Some(4));
        assert_eq!(policy.capacity_for(2), Some(8));
    }

    #[test]
    fn capacity_for_len() {
        let policy = LoadPolicy::default();
        assert_eq!(policy.capacity_for(0), Some(32));
        assert_eq!(policy.capacity_for(19), Some(32));
        assert_eq!(policy.capacity_for(20), Some(64));
        assert_eq!(policy.capacity_for(1000), Some(2048));
    }
}
