//! Spreadsheet headers recognised by the partner import
//!
//! Header lookup is forgiving: an exact match wins, otherwise headers are
//! compared case-insensitively with spaces and underscores removed, so
//! `Company Name` and `company_name` both resolve to [`COMPANY_NAME`].

use mdsync_domain::constants::IMPORT_LIST_SEPARATOR;
use mdsync_domain::ImportRow;
use serde_json::Value;

pub const CODE: &str = "Code";
pub const COMPANY_NAME: &str = "CompanyName";
pub const GROUP: &str = "Group";
pub const TYPE: &str = "Type";
pub const STATUS: &str = "Status";
pub const SCOPE: &str = "Scope";
pub const PHONE: &str = "Phone";
pub const EMAIL: &str = "Email";
pub const CURRENCY: &str = "Currency";
pub const PAYMENT_TERMS: &str = "PaymentTerms";
pub const EXCESS_MANAGERS: &str = "ExcessManagers";
pub const COMMODITY_STRENGTHS: &str = "CommodityStrengths";
pub const MFR_STRENGTHS: &str = "MfrStrengths";

pub const BILL_STREET: &str = "BillToStreet";
pub const BILL_BLOCK: &str = "BillToBlock";
pub const BILL_BUILDING: &str = "BillToBuilding";
pub const BILL_CITY: &str = "BillToCity";
pub const BILL_ZIP: &str = "BillToZipCode";
pub const BILL_COUNTY: &str = "BillToCounty";
pub const BILL_STATE: &str = "BillToState";
pub const BILL_COUNTRY: &str = "BillToCountry";

pub const SHIP_STREET: &str = "ShipToStreet";
pub const SHIP_BLOCK: &str = "ShipToBlock";
pub const SHIP_BUILDING: &str = "ShipToBuilding";
pub const SHIP_CITY: &str = "ShipToCity";
pub const SHIP_ZIP: &str = "ShipToZipCode";
pub const SHIP_COUNTY: &str = "ShipToCounty";
pub const SHIP_STATE: &str = "ShipToState";
pub const SHIP_COUNTRY: &str = "ShipToCountry";

/// Trimmed text of a cell, `None` when absent or blank.
pub fn cell(row: &ImportRow, header: &str) -> Option<String> {
    let value = row.get(header).or_else(|| {
        let wanted = normalize(header);
        row.iter().find(|(key, _)| normalize(key) == wanted).map(|(_, value)| value)
    })?;
    value_text(value)
}

/// Comma-separated cell split into trimmed, non-empty items.
pub fn list_cell(row: &ImportRow, header: &str) -> Vec<String> {
    cell(row, header).map(|raw| split_list(&raw)).unwrap_or_default()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(IMPORT_LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn normalize(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(pairs: &[(&str, Value)]) -> ImportRow {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn cells_are_trimmed_and_numbers_stringified() {
        let row = row(&[("Code", json!("  C1 ")), ("Group", json!(100)), ("Phone", json!("   "))]);
        assert_eq!(cell(&row, CODE).as_deref(), Some("C1"));
        assert_eq!(cell(&row, GROUP).as_deref(), Some("100"));
        assert_eq!(cell(&row, PHONE), None);
        assert_eq!(cell(&row, EMAIL), None);
    }

    #[test]
    fn headers_match_loosely() {
        let row = row(&[("company name", json!("Acme")), ("PAYMENT_TERMS", json!("Net 30"))]);
        assert_eq!(cell(&row, COMPANY_NAME).as_deref(), Some("Acme"));
        assert_eq!(cell(&row, PAYMENT_TERMS).as_deref(), Some("Net 30"));
    }

    #[test]
    fn lists_drop_blank_items() {
        assert_eq!(split_list("u1, u2,,  ,u3"), vec!["u1", "u2", "u3"]);
        assert!(split_list("").is_empty());
    }
}
