mod builds;
mod client;
mod test_report;
mod types;
mod url_utils;

pub use builds::{normalise_branch_name, parse_build, parse_build_list, DETACHED_BRANCH};
pub use client::JenkinsClient;
pub use test_report::{parse_failures_html, parse_failures_xml, ReportForm};
pub use types::BuildDto;
pub use url_utils::{failed_cases_xml_url, job_api_url, job_test_report_url, test_report_page_url};
