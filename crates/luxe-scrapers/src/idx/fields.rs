//! Alias-tolerant field resolution over raw IDX payloads.
//!
//! IDX vendors disagree on field names (`listPrice`, `ListPrice`, `price`)
//! and nesting (`property.bedrooms` vs `BedroomsTotal`). Every logical field
//! has an ordered alias list; dotted aliases walk nested objects.

use crate::normalize::parse_amount;
use serde_json::Value;

pub const ID_KEYS: &[&str] = &["mlsId", "listingId", "ListingId", "ListingKey", "id"];
pub const PRICE_KEYS: &[&str] = &["listPrice", "ListPrice", "price", "list_price"];
pub const BEDROOM_KEYS: &[&str] = &["property.bedrooms", "bedrooms", "BedroomsTotal", "beds"];
pub const BATHROOM_KEYS: &[&str] =
    &["property.bathrooms", "property.bathsFull", "bathrooms", "BathroomsTotalInteger", "baths"];
pub const AREA_KEYS: &[&str] = &["property.area", "LivingArea", "livingArea", "sqft"];
pub const STATUS_KEYS: &[&str] = &["mls.status", "status", "StandardStatus", "MlsStatus"];
pub const SOLD_PRICE_KEYS: &[&str] = &["sales.closePrice", "closePrice", "ClosePrice", "soldPrice"];
pub const SOLD_DATE_KEYS: &[&str] = &["sales.closeDate", "closeDate", "CloseDate", "soldDate"];
pub const ADDRESS_KEYS: &[&str] = &["address.full", "UnparsedAddress", "fullAddress", "address"];
pub const CITY_KEYS: &[&str] = &["address.city", "City", "city"];
pub const STATE_KEYS: &[&str] = &["address.state", "StateOrProvince", "state"];
pub const DESCRIPTION_KEYS: &[&str] = &["remarks", "PublicRemarks", "description"];
pub const PHOTO_KEYS: &[&str] = &["photos", "Media", "images"];
pub const TYPE_KEYS: &[&str] = &["property.style", "property.type", "PropertySubType", "PropertyType", "propertyType"];
pub const FEATURE_KEYS: &[&str] =
    &["property.interiorFeatures", "property.exteriorFeatures", "InteriorFeatures", "features"];

const INACTIVE_KEYWORDS: &[&str] = &["sold", "closed", "pending", "expired", "withdrawn", "cancelled", "canceled"];
const PHOTO_URL_KEYS: &[&str] = &["url", "MediaURL", "href", "src"];

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
        .filter(|found| !found.is_null())
}

/// First alias that holds a non-null, non-blank value.
pub fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| lookup(value, key))
        .find(|found| found.as_str().map_or(true, |s| !s.trim().is_empty()))
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => parse_amount(s).map(|f| f.round() as i64),
        _ => None,
    }
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First alias that resolves to a string (or number rendered as one).
pub fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| lookup(value, key)).find_map(as_string)
}

pub fn int_field(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().filter_map(|key| lookup(value, key)).find_map(as_i64)
}

/// Photo URLs given either as plain strings or as media objects.
pub fn photos(value: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = first_present(value, PHOTO_KEYS) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.clone()),
            Value::Object(_) => PHOTO_URL_KEYS.iter().find_map(|key| item.get(*key).and_then(Value::as_str)).map(str::to_string),
            _ => None,
        })
        .filter(|url| url.starts_with("http"))
        .collect()
}

/// Feature strings from either arrays or comma-separated text.
pub fn features(value: &Value) -> Vec<String> {
    FEATURE_KEYS
        .iter()
        .filter_map(|key| lookup(value, key))
        .flat_map(|found| match found {
            Value::Array(items) => items.iter().filter_map(as_string).collect::<Vec<_>>(),
            Value::String(text) => text.split(',').map(|part| part.trim().to_string()).collect(),
            _ => Vec::new(),
        })
        .filter(|feature| !feature.is_empty())
        .collect()
}

/// Sold, closed or otherwise off-market listings.
///
/// A status containing any inactive keyword counts, as does the presence of
/// a sold price or a sold date regardless of status.
pub fn is_inactive(value: &Value) -> bool {
    let status_inactive = string_field(value, STATUS_KEYS)
        .map(|status| status.to_lowercase())
        .map_or(false, |status| INACTIVE_KEYWORDS.iter().any(|keyword| status.contains(keyword)));

    status_inactive
        || int_field(value, SOLD_PRICE_KEYS).map_or(false, |price| price > 0)
        || string_field(value, SOLD_DATE_KEYS).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_aliases_and_nesting() {
        let simplyrets = json!({"mlsId": 1005192, "listPrice": 2500000, "property": {"bedrooms": 4, "bathsFull": 3}});
        let reso = json!({"ListingKey": "A77", "ListPrice": "3,100,000", "BedroomsTotal": 5, "BathroomsTotalInteger": 4});

        assert_eq!(string_field(&simplyrets, ID_KEYS).as_deref(), Some("1005192"));
        assert_eq!(int_field(&simplyrets, PRICE_KEYS), Some(2_500_000));
        assert_eq!(int_field(&simplyrets, BEDROOM_KEYS), Some(4));
        assert_eq!(int_field(&simplyrets, BATHROOM_KEYS), Some(3));

        assert_eq!(string_field(&reso, ID_KEYS).as_deref(), Some("A77"));
        assert_eq!(int_field(&reso, PRICE_KEYS), Some(3_100_000));
        assert_eq!(int_field(&reso, BEDROOM_KEYS), Some(5));
        assert_eq!(int_field(&reso, BATHROOM_KEYS), Some(4));
    }

    #[test]
    fn test_null_and_blank_values_are_skipped() {
        let listing = json!({"listPrice": null, "price": 900000, "status": "  ", "StandardStatus": "Active"});
        assert_eq!(int_field(&listing, PRICE_KEYS), Some(900_000));
        assert_eq!(first_present(&listing, STATUS_KEYS), Some(&json!("Active")));
    }

    #[test]
    fn test_inactive_detection() {
        assert!(is_inactive(&json!({"mls": {"status": "Closed"}})));
        assert!(is_inactive(&json!({"StandardStatus": "Active Under Contract - Pending"})));
        assert!(is_inactive(&json!({"status": "CANCELED"})));
        assert!(is_inactive(&json!({"status": "Active", "sales": {"closePrice": 1900000}})));
        assert!(is_inactive(&json!({"status": "Active", "closeDate": "2024-03-01"})));
        assert!(!is_inactive(&json!({"status": "Active", "sales": {"closePrice": null}})));
        assert!(!is_inactive(&json!({"listPrice": 1000000})));
    }

    #[test]
    fn test_photos_accept_strings_and_objects() {
        let listing = json!({"Media": [
            {"MediaURL": "https://photos.example.com/1.jpg"},
            "https://photos.example.com/2.jpg",
            {"caption": "no url"},
            42
        ]});
        assert_eq!(photos(&listing), vec!["https://photos.example.com/1.jpg", "https://photos.example.com/2.jpg"]);
    }

    #[test]
    fn test_features_from_arrays_and_text() {
        let listing = json!({"property": {"interiorFeatures": "Wine Cellar, Elevator", "exteriorFeatures": ["Dock"]}});
        assert_eq!(features(&listing), vec!["Wine Cellar", "Elevator", "Dock"]);
    }

    #[test]
    fn test_inactive_statuses_any_case() {
        for status in ["Sold", "CLOSED", "Pending", "expired", "Withdrawn", "Canceled", "CANCELLED"] {
            assert!(is_inactive(&json!({"status": status})), "{} should be inactive", status);
        }
        for status in ["Active", "ACTIVE", "Coming Soon", "New"] {
            assert!(!is_inactive(&json!({"status": status})), "{} should be active", status);
        }
    }

    #[test]
    fn test_sold_price_or_date_marks_inactive() {
        assert!(is_inactive(&json!({"status": "Active", "sales": {"closePrice": 1_250_000}})));
        assert!(is_inactive(&json!({"StandardStatus": "Active", "CloseDate": "2024-05-02"})));
        assert!(!is_inactive(&json!({"status": "Active", "closePrice": 0})));
        assert!(!is_inactive(&json!({"status": "Active", "soldDate": null})));
    }
}
