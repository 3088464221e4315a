//! Port for tag-based read cache invalidation

/// Drops cached reads associated with a tag.
///
/// Tags are `bp-master-<cardtype>` for partner lists and
/// `address-master-<cardcode>` for a partner's addresses.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_tag(&self, tag: &str);
}

/// Invalidator for contexts without a read cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate_tag(&self, _tag: &str) {}
}
