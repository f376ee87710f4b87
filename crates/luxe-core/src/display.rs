use tabled::settings::{object::Columns, Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::{Listing, LuxuryItem};

#[derive(Tabled)]
pub struct ListingTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Price (USD)", display_with = "display_right_14")]
    pub price: String,
    #[tabled(rename = "Beds", display_with = "display_right_4")]
    pub bedrooms: String,
    #[tabled(rename = "Baths", display_with = "display_right_5")]
    pub bathrooms: String,
    #[tabled(rename = "Sq ft", display_with = "display_right_8")]
    pub sqft: String,
    #[tabled(rename = "City")]
    pub city: String,
    #[tabled(rename = "Type")]
    pub property_type: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Tags")]
    pub tags: String,
}

#[derive(Tabled)]
pub struct ItemTableRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Price (USD)", display_with = "display_right_14")]
    pub price: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "House")]
    pub auction_house: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

fn display_right_14(s: &str) -> String {
    format!("{:>14}", s)
}

fn display_right_8(s: &str) -> String {
    format!("{:>8}", s)
}

fn display_right_5(s: &str) -> String {
    format!("{:>5}", s)
}

fn display_right_4(s: &str) -> String {
    format!("{:>4}", s)
}

/// Formats whole dollars with thousands separators.
pub(crate) fn format_usd(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

impl From<&Listing> for ListingTableRow {
    fn from(listing: &Listing) -> Self {
        let record = &listing.record;
        Self {
            id: listing.id,
            title: record.title.clone(),
            price: format_usd(record.price),
            bedrooms: or_na(record.bedrooms),
            bathrooms: or_na(record.bathrooms),
            sqft: or_na(record.sqft),
            city: record.city.clone(),
            property_type: record.property_type.to_string(),
            status: record.status.to_string(),
            tags: record.lifestyle_tags.join(", "),
        }
    }
}

impl From<&LuxuryItem> for ItemTableRow {
    fn from(item: &LuxuryItem) -> Self {
        let record = &item.record;
        Self {
            id: item.id,
            title: record.title.clone(),
            price: format_usd(record.price),
            category: record.category.clone(),
            auction_house: record.auction_house.clone(),
            status: record.status.to_string(),
        }
    }
}

pub fn create_listing_table(listings: &[Listing]) -> String {
    let rows: Vec<ListingTableRow> = listings.iter().map(ListingTableRow::from).collect();

    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Width::truncate(40).suffix("...")))
        .with(Modify::new(Columns::single(9)).with(Width::wrap(30)));

    table.to_string()
}

pub fn create_item_table(items: &[LuxuryItem]) -> String {
    let rows: Vec<ItemTableRow> = items.iter().map(ItemTableRow::from).collect();

    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Width::truncate(50).suffix("...")));

    table.to_string()
}
