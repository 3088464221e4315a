//! Provenance tagging
//!
//! Rows copied in from the ERP are stamped `sap`/`synced` before they are
//! written; rows created through the portal are stamped `portal`/`pending`.
//! The stamp is applied here, not by the stores, so every write path agrees.

use mdsync_domain::{Address, BusinessPartner, Contact, Provenance};

/// Records that carry a provenance pair.
pub trait Provenanced {
    fn provenance(&self) -> Provenance;
    fn set_provenance(&mut self, provenance: Provenance);

    fn is_read_only(&self) -> bool {
        self.provenance().source.is_erp_managed()
    }
}

impl Provenanced for BusinessPartner {
    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }
}

impl Provenanced for Address {
    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }
}

impl Provenanced for Contact {
    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn set_provenance(&mut self, provenance: Provenance) {
        self.provenance = provenance;
    }
}

/// Stamp a record as ERP-sourced.
pub fn stamp_erp<T: Provenanced>(mut record: T) -> T {
    record.set_provenance(Provenance::erp());
    record
}

/// Stamp a record as portal-created.
pub fn stamp_portal<T: Provenanced>(mut record: T) -> T {
    record.set_provenance(Provenance::portal());
    record
}

/// Stamp every record in a batch as ERP-sourced.
pub fn stamp_all_erp<T: Provenanced>(records: Vec<T>) -> Vec<T> {
    records.into_iter().map(stamp_erp).collect()
}
