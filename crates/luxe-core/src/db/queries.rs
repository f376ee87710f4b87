use super::types::ListingStatus;
use crate::{Listing, LuxuryItem, PropertyType, Result};
use sqlx::{sqlite::Sqlite, sqlite::SqlitePool, QueryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortField {
    #[default]
    Price,
    UpdatedAt,
    CreatedAt,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::UpdatedAt => "updated_at",
            SortField::CreatedAt => "created_at",
        }
    }
}

/// Read interface over the `listings` table.
pub struct ListingQueryBuilder<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    order: Option<(SortField, bool)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl<'a> ListingQueryBuilder<'a> {
    pub fn new() -> Self {
        let builder = QueryBuilder::new("SELECT * FROM listings WHERE 1=1");
        Self { builder, order: None, limit: None, offset: None }
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.builder.push(" AND status = ");
        self.builder.push_bind(status);
        self
    }

    pub fn with_city(mut self, city: &'a str) -> Self {
        self.builder.push(" AND city = ");
        self.builder.push_bind(city);
        self
    }

    pub fn with_source(mut self, source: &'a str) -> Self {
        self.builder.push(" AND source = ");
        self.builder.push_bind(source);
        self
    }

    pub fn with_property_type(mut self, property_type: PropertyType) -> Self {
        self.builder.push(" AND property_type = ");
        self.builder.push_bind(property_type);
        self
    }

    pub fn with_price_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let Some(min_price) = min {
            self.builder.push(" AND price >= ");
            self.builder.push_bind(min_price);
        }
        if let Some(max_price) = max {
            self.builder.push(" AND price <= ");
            self.builder.push_bind(max_price);
        }
        self
    }

    pub fn with_title(mut self, title: &'a str) -> Self {
        self.builder.push(" AND title = ");
        self.builder.push_bind(title);
        self
    }

    pub fn order_by(mut self, field: SortField, desc: bool) -> Self {
        self.order = Some((field, desc));
        self
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: Option<i64>) -> Self {
        self.offset = offset;
        self
    }

    pub async fn execute(mut self, pool: &SqlitePool) -> Result<Vec<Listing>> {
        push_tail(&mut self.builder, self.order, self.limit, self.offset);
        let rows = self.builder.build_query_as::<Listing>().fetch_all(pool).await?;
        Ok(rows)
    }
}

impl Default for ListingQueryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read interface over the `luxury_items` table.
pub struct ItemQueryBuilder<'a> {
    builder: QueryBuilder<'a, Sqlite>,
    order: Option<(SortField, bool)>,
    limit: Option<i64>,
}

impl<'a> ItemQueryBuilder<'a> {
    pub fn new() -> Self {
        let builder = QueryBuilder::new("SELECT * FROM luxury_items WHERE 1=1");
        Self { builder, order: None, limit: None }
    }

    pub fn with_category(mut self, category: &'a str) -> Self {
        self.builder.push(" AND category = ");
        self.builder.push_bind(category);
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.builder.push(" AND status = ");
        self.builder.push_bind(status);
        self
    }

    pub fn order_by(mut self, field: SortField, desc: bool) -> Self {
        self.order = Some((field, desc));
        self
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub async fn execute(mut self, pool: &SqlitePool) -> Result<Vec<LuxuryItem>> {
        push_tail(&mut self.builder, self.order, self.limit, None);
        let rows = self.builder.build_query_as::<LuxuryItem>().fetch_all(pool).await?;
        Ok(rows)
    }
}

impl Default for ItemQueryBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn push_tail(
    builder: &mut QueryBuilder<'_, Sqlite>,
    order: Option<(SortField, bool)>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    if let Some((field, desc)) = order {
        builder.push(" ORDER BY ");
        builder.push(field.column());
        if desc {
            builder.push(" DESC");
        }
    }
    // SQLite only accepts OFFSET after a LIMIT.
    if limit.is_some() || offset.is_some() {
        builder.push(" LIMIT ");
        builder.push_bind(limit.unwrap_or(-1));
    }
    if let Some(offset) = offset {
        builder.push(" OFFSET ");
        builder.push_bind(offset);
    }
}
