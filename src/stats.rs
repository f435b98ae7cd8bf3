use alloc::vec::Vec;

/// Utilisation statistics for a [`HashTable`](crate::HashTable).
///
/// Produced by [`HashTable::debug_stats`](crate::HashTable::debug_stats).
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of live entries
    pub populated: usize,
    /// Number of tombstoned slots
    pub tombstones: usize,
    /// Number of slots
    pub capacity: usize,
    /// `(populated + tombstones) / capacity`, the load that drives resizing
    pub load_factor: f64,
    /// `populated / capacity`
    pub live_load_factor: f64,
    /// Longest distance of any entry from its home slot
    pub max_probe_length: usize,
    /// Mean distance of an entry from its home slot
    pub mean_probe_length: f64,
    /// Bytes held by the slot array
    pub total_bytes: usize,
    /// Bytes held by slots without a live entry
    pub wasted_bytes: usize,
}

impl DebugStats {
    /// Pretty-print the statistics to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% live load)",
            self.populated,
            self.capacity,
            self.live_load_factor * 100.0
        );
        println!(
            "Tombstones: {} ({:.2}% total load)",
            self.tombstones,
            self.load_factor * 100.0
        );
        println!(
            "Probe length: max {}, mean {:.3}",
            self.max_probe_length, self.mean_probe_length
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// Histogram of probe distances.
///
/// Bin `i` counts the entries stored `i` slots past their home slot. Trailing
/// empty bins are not stored, so an empty table has no bins at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

impl ProbeHistogram {
    pub(crate) fn new(bins: Vec<usize>) -> Self {
        Self { bins }
    }

    /// The per-distance entry counts.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// The largest probe distance with at least one entry.
    pub fn max_distance(&self) -> Option<usize> {
        self.bins.iter().rposition(|&count| count != 0)
    }

    /// Mean probe distance, `0.0` when empty.
    pub fn mean_distance(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        let weighted: usize = self
            .bins
            .iter()
            .enumerate()
            .map(|(distance, &count)| distance * count)
            .sum();
        weighted as f64 / total as f64
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    ///
    /// Distances beyond `max_rows - 1` are folded into a final `++` row.
    #[cfg(feature = "std")]
    pub fn print(&self, max_rows: usize) {
        let max_rows = max_rows.max(1);
        let shown = self.bins.len().min(max_rows);
        let folded: usize = self.bins.iter().skip(shown).sum();

        let max = self
            .bins
            .iter()
            .take(shown)
            .copied()
            .chain(core::iter::once(folded))
            .max()
            .unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    7 => '▉',
                    _ => unreachable!(),
                };
                bar.push(ch);
            }
            bar
        };

        for (distance, &count) in self.bins.iter().take(shown).enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
        if folded > 0 {
            println!(" ++ | {} ({})", make_bar(folded), folded);
        }
    }
}
