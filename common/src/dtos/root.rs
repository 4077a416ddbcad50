use serde::{Deserialize, Serialize};

use crate::models::HealthStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootDto<'a> {
    pub version: &'a str,
    pub name: &'a str,
    #[serde(rename = "_links")]
    pub _links: RootLinks<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootLinks<'a> {
    pub health: &'a str,
    pub process: Option<&'a str>,
    pub records: Option<&'a str>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthDto {
    pub status: HealthStatus,
    pub name: String,
    pub version: String,
}
