use chrono::{DateTime, Utc};
use log::info;

use super::client::JenkinsClient;
use super::types::{ActionDto, BuildDto, BuildListDto, RevisionDto};
use super::url_utils::job_api_url;
use crate::error::Result;
use crate::models::BuildRecord;

const GIT_BUILD_DATA_CLASS: &str = "hudson.plugins.git.util.BuildData";
const REF_PREFIXES: [&str; 3] = ["refs/", "remotes/", "origin/"];

pub const DETACHED_BRANCH: &str = "** detached **";

impl JenkinsClient {
    pub async fn fetch_build_history(&self, base: &str, job: &str) -> Result<Vec<BuildRecord>> {
        let url = job_api_url(base, job)?;
        info!("Fetching build history for job: {job}");

        let body = self.fetch(&url).await?;
        let builds = parse_build_list(&body)?;

        info!("Parsed {} builds", builds.len());
        Ok(builds)
    }
}

/// Parses a `{"builds": [...]}` response. A missing `builds` key is an empty history.
pub fn parse_build_list(body: &str) -> Result<Vec<BuildRecord>> {
    let list: BuildListDto = serde_json::from_str(body)?;
    Ok(list.builds.into_iter().map(parse_build).collect())
}

pub fn parse_build(build: BuildDto) -> BuildRecord {
    let timestamp = build.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis);

    // An in-progress build reports zero; the estimate is the best figure available.
    let duration = match (build.building, build.duration) {
        (Some(true), Some(0)) => build.estimated_duration,
        (_, duration) => duration,
    };

    let (revision, branch_name) = match trigger_data(build.actions.unwrap_or_default()) {
        Some(revision) => revision_and_branch_name(revision),
        None => (None, None),
    };

    BuildRecord {
        number: build.number,
        building: build.building,
        timestamp,
        duration,
        revision,
        branch_name,
    }
}

/// The `lastBuiltRevision` of the first git build-data action, if any.
fn trigger_data(actions: Vec<Option<ActionDto>>) -> Option<RevisionDto> {
    actions
        .into_iter()
        .flatten()
        .find(|action| action.class.as_deref() == Some(GIT_BUILD_DATA_CLASS))
        .and_then(|action| action.last_built_revision)
}

fn revision_and_branch_name(revision: RevisionDto) -> (Option<String>, Option<String>) {
    let branch_name = revision
        .branch
        .and_then(|branches| branches.into_iter().next())
        .and_then(|branch| branch.name)
        .map(|name| normalise_branch_name(&name));

    (revision.sha1, branch_name)
}

/// Strips ref prefixes from a branch name; a detached HEAD becomes [`DETACHED_BRANCH`].
pub fn normalise_branch_name(branch_name: &str) -> String {
    let stripped = REF_PREFIXES
        .iter()
        .fold(branch_name.to_string(), |name, prefix| name.replace(*prefix, ""));

    if stripped == "detached" {
        DETACHED_BRANCH.to_string()
    } else {
        stripped
    }
}
