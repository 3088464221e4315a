//! Sequential address ID allocation
//!
//! Portal-created addresses are keyed `A<digits>`. The next ID is derived
//! from the largest numeric suffix currently stored; IDs that do not match
//! `A` followed only by digits (ERP-named addresses, legacy keys) are ignored.
//!
//! Two formats are in circulation: the bulk import and partner upsert paths
//! zero-pad to six digits (`A000042`), the single-address upsert path does not
//! (`A42`). Both parse to the same suffix, so allocation stays monotonic
//! across them.

use mdsync_domain::constants::{ADDRESS_ID_PREFIX, PADDED_ADDRESS_ID_WIDTH};

/// How an allocated suffix is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    /// `A` + suffix zero-padded to the given width.
    Padded(usize),
    /// `A` + suffix with no padding.
    Unpadded,
}

impl IdFormat {
    /// Format used by bulk import and partner creation.
    pub const fn padded() -> Self {
        Self::Padded(PADDED_ADDRESS_ID_WIDTH)
    }
}

/// Numeric suffix of a sequential address ID, or `None` when the ID does not
/// match `^A[0-9]+$` or the suffix overflows.
pub fn address_suffix(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(ADDRESS_ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Largest sequential suffix among `ids`, `0` when none qualify.
pub fn max_address_suffix<'a, I>(ids: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().filter_map(address_suffix).max().unwrap_or(0)
}

pub fn format_address_id(suffix: u64, format: IdFormat) -> String {
    match format {
        IdFormat::Padded(width) => format!("{ADDRESS_ID_PREFIX}{suffix:0width$}"),
        IdFormat::Unpadded => format!("{ADDRESS_ID_PREFIX}{suffix}"),
    }
}

/// Hands out consecutive address IDs from a single seed.
///
/// Seed it once per batch with the stored maximum and draw every ID for the
/// batch from it. Re-reading the maximum per row would hand the same ID to
/// every row of an uncommitted batch.
#[derive(Debug, Clone)]
pub struct AddressIdAllocator {
    last: u64,
    format: IdFormat,
}

impl AddressIdAllocator {
    /// Start after `current_max` (`0` for an empty table, giving `A…1`).
    pub fn seeded(current_max: u64, format: IdFormat) -> Self {
        Self { last: current_max, format }
    }

    pub fn next_id(&mut self) -> String {
        self.last = self.last.saturating_add(1);
        format_address_id(self.last, self.format)
    }

    /// Allocate `n` consecutive IDs.
    pub fn allocate(&mut self, n: usize) -> Vec<String> {
        (0..n).map(|_| self.next_id()).collect()
    }

    /// Last suffix handed out (or the seed if nothing was allocated).
    pub fn last_suffix(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_requires_prefix_and_only_digits() {
        assert_eq!(address_suffix("A000042"), Some(42));
        assert_eq!(address_suffix("A7"), Some(7));
        assert_eq!(address_suffix("A"), None);
        assert_eq!(address_suffix("B12"), None);
        assert_eq!(address_suffix("A12x"), None);
        assert_eq!(address_suffix("Main Office"), None);
        assert_eq!(address_suffix("A99999999999999999999999"), None);
    }

    #[test]
    fn max_ignores_non_matching_ids() {
        let ids = ["A000003", "Main Office", "A10", "ABC"];
        assert_eq!(max_address_suffix(ids), 10);
    }

    #[test]
    fn empty_table_starts_at_one() {
        let max = max_address_suffix(std::iter::empty());
        assert_eq!(max, 0);

        let mut allocator = AddressIdAllocator::seeded(max, IdFormat::padded());
        assert_eq!(allocator.next_id(), "A000001");
    }

    #[test]
    fn table_of_only_foreign_ids_starts_at_one() {
        let max = max_address_suffix(["HQ", "Warehouse 2"]);
        let mut allocator = AddressIdAllocator::seeded(max, IdFormat::Unpadded);
        assert_eq!(allocator.next_id(), "A1");
    }

    #[test]
    fn batch_allocation_is_consecutive_from_one_seed() {
        let mut allocator = AddressIdAllocator::seeded(41, IdFormat::padded());
        let ids = allocator.allocate(4);
        assert_eq!(ids, vec!["A000042", "A000043", "A000044", "A000045"]);
        assert_eq!(allocator.last_suffix(), 45);
    }

    // The single-address path renders without padding while the bulk paths pad.
    // Both must keep parsing to the same suffix so neither path reuses an ID.
    #[test]
    fn padded_and_unpadded_paths_diverge_in_format_only() {
        let mut padded = AddressIdAllocator::seeded(5, IdFormat::padded());
        let mut unpadded = AddressIdAllocator::seeded(5, IdFormat::Unpadded);

        let a = padded.next_id();
        let b = unpadded.next_id();
        assert_eq!(a, "A000006");
        assert_eq!(b, "A6");
        assert_ne!(a, b);
        assert_eq!(address_suffix(&a), address_suffix(&b));
        assert_eq!(max_address_suffix([a.as_str(), b.as_str()]), 6);
    }

    #[test]
    fn suffix_wider_than_padding_is_not_truncated() {
        assert_eq!(format_address_id(1_234_567, IdFormat::padded()), "A1234567");
    }
}
