use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct BuildListDto {
    #[serde(default)]
    pub builds: Vec<BuildDto>,
}

/// A build as the JSON API returns it. Any key may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDto {
    pub number: Option<u64>,
    pub building: Option<bool>,
    /// Epoch milliseconds.
    pub timestamp: Option<i64>,
    pub duration: Option<i64>,
    pub estimated_duration: Option<i64>,
    pub actions: Option<Vec<Option<ActionDto>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDto {
    #[serde(rename = "_class")]
    pub class: Option<String>,
    pub last_built_revision: Option<RevisionDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevisionDto {
    #[serde(rename = "SHA1")]
    pub sha1: Option<String>,
    pub branch: Option<Vec<BranchDto>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BranchDto {
    pub name: Option<String>,
}
