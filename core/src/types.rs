//! Payload DTOs for registering a table asset.
//!
//! Field names follow the catalog's wire format, including the
//! double-underscore `__creatorId` system property.

use serde::{Deserialize, Serialize};

const SAMPLE_TIMESTAMP: &str = "2015-05-15T03:48:39.2425547Z";

/// A table data asset as registered in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableAsset {
    #[serde(rename = "__creatorId")]
    pub creator_id: String,
    pub name: String,
    pub data_source: DataSource,
    pub dsl: DataSourceLocation,
    pub modified_time: String,
    pub last_registered_time: String,
    pub last_registered_by: UserInfo,
    pub schemas: Vec<Schema>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub source_type: String,
    pub object_type: String,
    pub format_type: String,
}

/// Where the asset physically lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataSourceLocation {
    pub protocol: String,
    pub authentication: String,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub server: String,
    pub database: String,
    pub schema: String,
    pub object: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub upn: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "__creatorId")]
    pub creator_id: String,
    pub modified_time: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub is_nullable: bool,
    #[serde(rename = "type")]
    pub data_type: String,
    pub max_length: u32,
    pub precision: u32,
}

impl TableAsset {
    /// The Northwind orders table, registered under `name`.
    pub fn sample(name: &str) -> Self {
        Self {
            creator_id: "SQL Server".to_string(),
            name: name.to_string(),
            data_source: DataSource {
                source_type: "SQL Server".to_string(),
                object_type: "Table".to_string(),
                format_type: "Structured".to_string(),
            },
            dsl: DataSourceLocation {
                protocol: "tds".to_string(),
                authentication: "windows".to_string(),
                address: Address {
                    server: "MyServer.contoso.com".to_string(),
                    database: "Northwind".to_string(),
                    schema: "dbo".to_string(),
                    object: name.to_string(),
                },
            },
            modified_time: SAMPLE_TIMESTAMP.to_string(),
            last_registered_time: SAMPLE_TIMESTAMP.to_string(),
            last_registered_by: UserInfo {
                upn: "user1@contoso.com".to_string(),
                first_name: "User1FirstName".to_string(),
                last_name: "User1LastName".to_string(),
            },
            schemas: vec![Schema {
                creator_id: "SQL Server".to_string(),
                modified_time: SAMPLE_TIMESTAMP.to_string(),
                columns: vec![
                    Column::new("OrderID", false, "int", 4, 10),
                    Column::new("CustomerID", true, "nchar", 10, 0),
                    Column::new("OrderDate", true, "datetime", 8, 23),
                ],
            }],
        }
    }
}

impl Column {
    pub fn new(name: &str, is_nullable: bool, data_type: &str, max_length: u32, precision: u32) -> Self {
        Self {
            name: name.to_string(),
            is_nullable,
            data_type: data_type.to_string(),
            max_length,
            precision,
        }
    }
}
