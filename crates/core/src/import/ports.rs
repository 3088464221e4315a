//! Port interfaces for the batch import

use std::collections::HashSet;

use async_trait::async_trait;
use mdsync_domain::Result;

use super::builder::ImportWrite;

/// Row counts actually inserted by a commit (duplicates are skipped).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCommit {
    pub partners: usize,
    pub addresses: usize,
    pub excess_managers: usize,
}

/// Persistence used by the import pipeline.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Which of `codes` already exist as non-deleted partners.
    async fn existing_card_codes(&self, codes: &[String]) -> Result<HashSet<String>>;

    /// Largest `A<digits>` address suffix, `0` when none.
    async fn max_address_suffix(&self) -> Result<u64>;

    /// Insert partners, addresses and junction rows in one transaction,
    /// skipping rows whose key already exists.
    async fn commit_import(&self, write: &ImportWrite) -> Result<ImportCommit>;
}
