//! Portal-side master data maintenance

pub mod ports;
pub mod service;

pub use ports::{AddressRepository, ContactRepository, PartnerRepository};
pub use service::MasterDataService;
