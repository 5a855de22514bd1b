//! Shared fixtures for integration tests

use tablecast::{Catalog, ColumnDescriptor, TableDescriptor};

const SEQ: Option<&str> = Some("nextval('id_seq'::regclass)");

/// Catalog shaped like an influencer-marketing database
pub fn marketing_catalog() -> Catalog {
    Catalog::from_tables(vec![
        TableDescriptor::new(
            "profiles",
            vec![
                ColumnDescriptor::new("id", "integer", SEQ),
                ColumnDescriptor::new("display_name", "character varying", None),
                ColumnDescriptor::new("platform", "character varying", None),
                ColumnDescriptor::new("follower_count", "integer", None),
            ],
        ),
        TableDescriptor::new(
            "campaigns",
            vec![
                ColumnDescriptor::new("campaign_id", "integer", SEQ),
                ColumnDescriptor::new("title", "text", None),
                ColumnDescriptor::new("campaign_budget", "numeric", None),
                ColumnDescriptor::new("status", "character varying", None),
            ],
        ),
        TableDescriptor::new(
            "brands",
            vec![
                ColumnDescriptor::new("id", "integer", SEQ),
                ColumnDescriptor::new("name", "character varying", None),
                ColumnDescriptor::new("industry", "text", None),
                ColumnDescriptor::new("budget", "numeric", None),
            ],
        ),
    ])
}
