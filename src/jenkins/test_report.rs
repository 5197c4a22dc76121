use log::{debug, info};
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use url::Url;

use super::client::JenkinsClient;
use super::url_utils::{failed_cases_xml_url, job_test_report_url, test_report_page_url};
use crate::error::{JenError, Result};
use crate::models::{FailureRecord, FailureSet};

const FAILING_STATUSES: [&str; 2] = ["FAILED", "REGRESSION"];

/// Which rendition of a test report to read failures from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportForm {
    /// `job/{target}/testReport/api/xml`, filtered to failing cases.
    Xml,
    /// The `{target}/testReport/` page, scraped by table position.
    Html,
}

impl ReportForm {
    /// The page a user would open to look at the same report.
    pub fn report_url(self, base: &str, target: &str) -> Result<Url> {
        match self {
            Self::Xml => job_test_report_url(base, target),
            Self::Html => test_report_page_url(base, target),
        }
    }

    fn fetch_url(self, base: &str, target: &str) -> Result<Url> {
        match self {
            Self::Xml => failed_cases_xml_url(base, target),
            Self::Html => test_report_page_url(base, target),
        }
    }
}

impl JenkinsClient {
    pub async fn fetch_failures(
        &self,
        base: &str,
        target: &str,
        form: ReportForm,
    ) -> Result<FailureSet> {
        let url = form.fetch_url(base, target)?;
        info!("Fetching {form:?} test report for: {target}");

        let body = self.fetch(&url).await?;
        let failures = match form {
            ReportForm::Xml => parse_failures_xml(&body)?,
            ReportForm::Html => parse_failures_html(&body)?,
        };

        info!("{target}: {} failing tests", failures.len());
        Ok(failures)
    }
}

#[derive(Clone, Copy)]
enum CaseField {
    ClassName,
    Name,
    Status,
}

impl CaseField {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"className" => Some(Self::ClassName),
            b"name" => Some(Self::Name),
            b"status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[derive(Default)]
struct CaseFields {
    class_name: Option<String>,
    name: Option<String>,
    status: Option<String>,
}

impl CaseFields {
    fn slot(&mut self, field: CaseField) -> &mut Option<String> {
        match field {
            CaseField::ClassName => &mut self.class_name,
            CaseField::Name => &mut self.name,
            CaseField::Status => &mut self.status,
        }
    }

    fn is_failing(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| FAILING_STATUSES.contains(&status))
    }

    fn into_failure(self) -> Result<Option<FailureRecord>> {
        if !self.is_failing() {
            return Ok(None);
        }
        match (self.class_name, self.name) {
            (Some(class_name), Some(name)) => Ok(Some(FailureRecord::new(class_name, name))),
            _ => Err(JenError::MalformedReport(
                "failing <case> without a className or name element".to_string(),
            )),
        }
    }
}

/// Collects failing `<case>` elements from a flat `<suite>` of cases.
///
/// Cases whose `status` is neither `FAILED` nor `REGRESSION` are skipped, so an
/// unfiltered report works too.
pub fn parse_failures_xml(xml: &str) -> Result<FailureSet> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut failures = FailureSet::new();
    let mut case: Option<CaseFields> = None;
    let mut field: Option<CaseField> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if e.name().as_ref() == b"case" {
                    case = Some(CaseFields::default());
                }
                field = CaseField::from_tag(e.name().as_ref());
                // Present but possibly empty: no Text event follows `<name></name>`.
                if let (Some(case), Some(field)) = (case.as_mut(), field) {
                    case.slot(field).get_or_insert_with(String::new);
                }
            }
            Event::Empty(e) => {
                if let (Some(case), Some(field)) =
                    (case.as_mut(), CaseField::from_tag(e.name().as_ref()))
                {
                    case.slot(field).get_or_insert_with(String::new);
                }
            }
            Event::Text(e) => {
                if let (Some(case), Some(field)) = (case.as_mut(), field) {
                    let text = e.unescape()?;
                    case.slot(field)
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
            }
            Event::End(e) => {
                field = None;
                if e.name().as_ref() == b"case" {
                    let finished = case.take().map(CaseFields::into_failure).transpose()?;
                    if let Some(failure) = finished.flatten() {
                        debug!("Failing case: {failure}");
                        failures.insert(failure);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(failures)
}

/// Scrapes the failure table of a test report page.
///
/// The failures are the second `<table>`; each row after the header names its
/// test in the third link. Any other shape is an error. The page only shows a
/// display name, so that whole name is the test name and the class is empty;
/// records then order by display name.
pub fn parse_failures_html(html: &str) -> Result<FailureSet> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let link_selector = selector("a")?;

    let table = document.select(&table_selector).nth(1).ok_or_else(|| {
        JenError::MalformedReport("expected at least two tables".to_string())
    })?;

    table
        .select(&row_selector)
        .enumerate()
        .skip(1)
        .map(|(index, row)| -> Result<FailureRecord> {
            let link = row.select(&link_selector).nth(2).ok_or_else(|| {
                JenError::MalformedReport(format!("row {index} has fewer than three links"))
            })?;
            let display_name = link.text().collect::<String>();
            Ok(FailureRecord::new("", display_name.trim()))
        })
        .collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| JenError::MalformedReport(format!("invalid selector '{css}': {e:?}")))
}
