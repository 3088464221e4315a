//! Per-row validation for the partner import

use std::collections::{HashMap, HashSet};

use mdsync_domain::{AddressFields, CardType, ExcessManagerCheck, ImportMetaData, ImportRow, LookupEntry};

use super::columns::{self, cell, list_cell};

/// Case-insensitive code/name index over one lookup table.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    by_code: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl LookupIndex {
    pub fn new(entries: &[LookupEntry]) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.by_code.insert(entry.code.trim().to_lowercase(), entry.code.clone());
            if !entry.name.trim().is_empty() {
                index.by_name.insert(entry.name.trim().to_lowercase(), entry.code.clone());
            }
        }
        index
    }

    /// Canonical code for a value given either as a code or as a name.
    pub fn resolve(&self, raw: &str) -> Option<String> {
        let key = raw.trim().to_lowercase();
        self.by_code.get(&key).or_else(|| self.by_name.get(&key)).cloned()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.by_code.contains_key(&code.trim().to_lowercase())
    }
}

/// Reference data for one import, indexed once per chunk.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub groups: LookupIndex,
    pub payment_terms: LookupIndex,
    pub currencies: LookupIndex,
    pub item_groups: LookupIndex,
    pub manufacturers: LookupIndex,
    pub users: HashSet<String>,
}

impl Lookups {
    pub fn from_meta(meta: &ImportMetaData) -> Self {
        Self {
            groups: LookupIndex::new(&meta.groups),
            payment_terms: LookupIndex::new(&meta.payment_terms),
            currencies: LookupIndex::new(&meta.currencies),
            item_groups: LookupIndex::new(&meta.item_groups),
            manufacturers: LookupIndex::new(&meta.manufacturers),
            users: meta.users.iter().map(|u| u.trim().to_string()).collect(),
        }
    }
}

/// A row that passed validation, with lookups resolved to codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    pub card_code: String,
    pub card_name: String,
    pub group_code: Option<String>,
    pub partner_type: Option<String>,
    pub status: Option<String>,
    pub scope: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub currency: Option<String>,
    pub payment_terms: Option<String>,
    pub excess_managers: Vec<String>,
    pub commodity_strengths: Vec<String>,
    pub mfr_strengths: Vec<String>,
    pub billing: AddressFields,
    pub shipping: AddressFields,
}

/// Validates rows of one card type against the lookups.
pub struct RowValidator<'a> {
    card_type: CardType,
    lookups: &'a Lookups,
    manager_check: ExcessManagerCheck,
}

impl<'a> RowValidator<'a> {
    pub fn new(card_type: CardType, lookups: &'a Lookups, manager_check: ExcessManagerCheck) -> Self {
        Self { card_type, lookups, manager_check }
    }

    /// Validate `row`. `known_codes` holds codes already stored plus codes
    /// accepted earlier in the chunk.
    ///
    /// Returns every reason the row was rejected, not just the first.
    pub fn validate(
        &self,
        row: &ImportRow,
        known_codes: &HashSet<String>,
    ) -> Result<ValidatedRow, Vec<String>> {
        let mut errors = Vec::new();

        let required: &[(&str, &str)] = match self.card_type {
            CardType::Customer => &[
                (columns::COMPANY_NAME, "Company name"),
                (columns::GROUP, "Group"),
                (columns::TYPE, "Type"),
                (columns::STATUS, "Status"),
            ],
            CardType::Supplier => &[
                (columns::COMPANY_NAME, "Company name"),
                (columns::GROUP, "Group"),
                (columns::STATUS, "Status"),
                (columns::SCOPE, "Scope"),
            ],
        };
        for (header, label) in required {
            if cell(row, header).is_none() {
                errors.push(format!("{label} is required"));
            }
        }

        let card_code = cell(row, columns::CODE);
        match &card_code {
            None => errors.push("Code is required".to_string()),
            Some(code) if known_codes.contains(code) => {
                errors.push(format!("Code {code} already exists"));
            }
            Some(_) => {}
        }

        let group_code = self.resolve(row, columns::GROUP, &self.lookups.groups, "group", &mut errors);
        let payment_terms = self.resolve(
            row,
            columns::PAYMENT_TERMS,
            &self.lookups.payment_terms,
            "payment terms",
            &mut errors,
        );
        let currency =
            self.resolve(row, columns::CURRENCY, &self.lookups.currencies, "currency", &mut errors);

        let excess_managers = list_cell(row, columns::EXCESS_MANAGERS);
        let commodity_strengths = list_cell(row, columns::COMMODITY_STRENGTHS);
        let mfr_strengths = list_cell(row, columns::MFR_STRENGTHS);

        match self.card_type {
            CardType::Customer => self.check_excess_managers(&excess_managers, &mut errors),
            CardType::Supplier => {
                let unknown: Vec<&str> = commodity_strengths
                    .iter()
                    .filter(|id| !self.lookups.item_groups.contains_code(id))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    errors.push(format!("Unknown commodity strength: {}", unknown.join(", ")));
                }

                let unknown: Vec<&str> = mfr_strengths
                    .iter()
                    .filter(|code| !self.lookups.manufacturers.contains_code(code))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    errors.push(format!("Unknown manufacturer: {}", unknown.join(", ")));
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedRow {
            card_code: card_code.unwrap_or_default(),
            card_name: cell(row, columns::COMPANY_NAME).unwrap_or_default(),
            group_code,
            partner_type: cell(row, columns::TYPE),
            status: cell(row, columns::STATUS),
            scope: cell(row, columns::SCOPE),
            phone: cell(row, columns::PHONE),
            email: cell(row, columns::EMAIL),
            currency,
            payment_terms,
            excess_managers,
            commodity_strengths,
            mfr_strengths,
            billing: address_fields(row, BILLING_HEADERS),
            shipping: address_fields(row, SHIPPING_HEADERS),
        })
    }

    fn resolve(
        &self,
        row: &ImportRow,
        header: &str,
        index: &LookupIndex,
        label: &str,
        errors: &mut Vec<String>,
    ) -> Option<String> {
        let raw = cell(row, header)?;
        let resolved = index.resolve(&raw);
        if resolved.is_none() {
            errors.push(format!("Unknown {label}: {raw}"));
        }
        resolved
    }

    fn check_excess_managers(&self, managers: &[String], errors: &mut Vec<String>) {
        if managers.is_empty() {
            return;
        }
        let users = &self.lookups.users;
        match self.manager_check {
            // Rejects the row when every referenced manager exists.
            ExcessManagerCheck::Literal => {
                if managers.iter().all(|id| users.contains(id)) {
                    errors.push(format!("Excess manager not found: {}", managers.join(", ")));
                }
            }
            ExcessManagerCheck::Intended => {
                let missing: Vec<&str> =
                    managers.iter().filter(|id| !users.contains(*id)).map(String::as_str).collect();
                if !missing.is_empty() {
                    errors.push(format!("Excess manager not found: {}", missing.join(", ")));
                }
            }
        }
    }
}

type AddressHeaders = [&'static str; 8];

const BILLING_HEADERS: AddressHeaders = [
    columns::BILL_STREET,
    columns::BILL_BLOCK,
    columns::BILL_BUILDING,
    columns::BILL_CITY,
    columns::BILL_ZIP,
    columns::BILL_COUNTY,
    columns::BILL_STATE,
    columns::BILL_COUNTRY,
];

const SHIPPING_HEADERS: AddressHeaders = [
    columns::SHIP_STREET,
    columns::SHIP_BLOCK,
    columns::SHIP_BUILDING,
    columns::SHIP_CITY,
    columns::SHIP_ZIP,
    columns::SHIP_COUNTY,
    columns::SHIP_STATE,
    columns::SHIP_COUNTRY,
];

fn address_fields(row: &ImportRow, headers: AddressHeaders) -> AddressFields {
    let [street, block, building, city, zip, county, state, country] = headers;
    AddressFields {
        street: cell(row, street),
        block: cell(row, block),
        building: cell(row, building),
        city: cell(row, city),
        zip_code: cell(row, zip),
        county: cell(row, county),
        state: cell(row, state),
        country: cell(row, country),
    }
}
