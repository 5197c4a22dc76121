use url::Url;

use crate::error::Result;

const BUILD_TREE: &str = "builds[number,building,timestamp,duration,estimatedDuration,\
                          actions[lastBuiltRevision[SHA1,branch[name]]]]";
const FAILED_CASES_XPATH: &str = "//case[status='FAILED' or status='REGRESSION']";
const CASES_TREE: &str = "suites[cases[status,className,name]]";

fn join_base(base: &str, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}/{path}", base.trim_end_matches('/')))?)
}

/// Build list of a job, trimmed to the fields the history report needs.
pub fn job_api_url(base: &str, job: &str) -> Result<Url> {
    let mut url = join_base(base, &format!("job/{job}/api/json"))?;
    url.query_pairs_mut()
        .append_pair("depth", "1")
        .append_pair("tree", BUILD_TREE);
    Ok(url)
}

/// Human-facing test report page of an arbitrary target path (e.g. `job/main/lastBuild`).
pub fn test_report_page_url(base: &str, target: &str) -> Result<Url> {
    join_base(base, &format!("{}/testReport/", target.trim_matches('/')))
}

pub fn job_test_report_url(base: &str, job: &str) -> Result<Url> {
    join_base(base, &format!("job/{}/testReport/", job.trim_matches('/')))
}

/// XML test report of a job, filtered server-side down to failing cases.
pub fn failed_cases_xml_url(base: &str, job: &str) -> Result<Url> {
    let mut url = join_base(base, &format!("job/{}/testReport/api/xml", job.trim_matches('/')))?;
    url.query_pairs_mut()
        .append_pair("xpath", FAILED_CASES_XPATH)
        .append_pair("wrapper", "suite")
        .append_pair("tree", CASES_TREE);
    Ok(url)
}
