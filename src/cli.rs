use std::future::Future;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use crate::config::{env_base_url, parse_timeout, resolve_base_url, DEFAULT_TIMEOUT};
use crate::error::JenError;
use crate::jenkins::{JenkinsClient, ReportForm};
use crate::models::BuildRecord;
use crate::report::{render_history, FailureComparison, Palette};

const BASE_HELP: &str = "Jenkins URL base (e.g. http://localhost:8000). \
    If not given, it is taken from the env var JEN_COMPARE_DEFAULT_BASE";

#[derive(Parser, Debug)]
#[command(name = "jen-job-history")]
#[command(author, version, about = "Show the recent build history of a Jenkins job", long_about = None)]
#[command(override_usage = "jen-job-history [OPTIONS] [BASE_URL] <JOB>")]
pub struct HistoryCli {
    #[arg(value_name = "ARGS", num_args = 1..=2, required = true, help = format!("[BASE_URL] JOB. {BASE_HELP}"))]
    positionals: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(short, long, value_name = "N", value_parser = parse_timeout, default_value_t = DEFAULT_TIMEOUT)]
    timeout: u64,

    /// Print the builds as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
#[command(name = "jen-compare")]
#[command(author, version, about = "Compare failing tests between two Jenkins targets", long_about = None)]
#[command(override_usage = "jen-compare [OPTIONS] [BASE_URL] <LEFT> <RIGHT>")]
pub struct CompareCli {
    #[arg(value_name = "ARGS", num_args = 2..=3, required = true, help = format!("[BASE_URL] LEFT RIGHT (e.g. main some-feature). {BASE_HELP}"))]
    positionals: Vec<String>,

    /// Disable coloured output
    #[arg(short, long, default_value_t = false)]
    monochrome: bool,

    /// HTTP timeout in seconds
    #[arg(short, long, value_name = "N", value_parser = parse_timeout, default_value_t = DEFAULT_TIMEOUT)]
    timeout: u64,

    /// Scrape the HTML report page at {BASE_URL}/{TARGET}/testReport/ instead of the XML API
    #[arg(long, default_value_t = false)]
    html: bool,
}

impl HistoryCli {
    fn base_and_job(&self) -> (Option<&str>, &str) {
        match self.positionals.as_slice() {
            [base, job] => (Some(base.as_str()), job.as_str()),
            [job] => (None, job.as_str()),
            _ => unreachable!("clap enforces 1..=2 positionals"),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        if let Some(output) = self.history_output().await? {
            println!("{output}");
        }
        Ok(())
    }

    /// The text to print: the table (or JSON), or the diagnostic of a failed fetch.
    async fn history_output(&self) -> Result<Option<String>> {
        let (cli_base, job) = self.base_and_job();
        let base = resolve_base_url(cli_base.map(str::to_string), env_base_url())?;
        info!("Using base URL: {base}");

        let client = JenkinsClient::new(Duration::from_secs(self.timeout))?;

        // A fetch failure degrades to an empty history.
        let builds = match client.fetch_build_history(&base, job).await {
            Ok(builds) => builds,
            Err(err) if err.is_fetch_failure() => {
                return Ok(Some(err.without_query().to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        if builds.is_empty() {
            warn!("No builds found for job: {job}");
            return Ok(None);
        }

        self.render(&builds).map(Some)
    }

    fn render(&self, builds: &[BuildRecord]) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(builds)?)
        } else {
            Ok(render_history(builds))
        }
    }
}

impl CompareCli {
    fn base_and_targets(&self) -> (Option<&str>, &str, &str) {
        match self.positionals.as_slice() {
            [base, left, right] => (Some(base.as_str()), left.as_str(), right.as_str()),
            [left, right] => (None, left.as_str(), right.as_str()),
            _ => unreachable!("clap enforces 2..=3 positionals"),
        }
    }

    fn report_form(&self) -> ReportForm {
        if self.html {
            ReportForm::Html
        } else {
            ReportForm::Xml
        }
    }

    /// Any fetch failure is fatal here.
    pub async fn execute(&self) -> Result<()> {
        let (cli_base, left, right) = self.base_and_targets();
        let base = resolve_base_url(cli_base.map(str::to_string), env_base_url())?;
        let form = self.report_form();

        println!(
            "Comparing test results between {} and {}",
            form.report_url(&base, left)?,
            form.report_url(&base, right)?
        );

        let client = JenkinsClient::new(Duration::from_secs(self.timeout))?;
        let left_failed = client.fetch_failures(&base, left, form).await?;
        let right_failed = client.fetch_failures(&base, right, form).await?;

        let comparison = FailureComparison::new(&left_failed, &right_failed);
        println!();
        println!("{}", comparison.render(Palette::new(self.monochrome)));
        Ok(())
    }
}

/// Parses arguments, exiting with status 1 on a usage error (help and version exit 0).
pub fn parse_args<C: Parser>() -> C {
    C::try_parse().unwrap_or_else(|err| {
        if err.use_stderr() {
            let _ = err.print();
            std::process::exit(1);
        }
        err.exit()
    })
}

/// Drives a tool to completion, turning Ctrl-C into a quiet successful exit.
pub async fn run_until_interrupted<F>(work: F) -> ExitCode
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        result = work => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                report_fatal(&err);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            println!();
            ExitCode::SUCCESS
        }
    }
}

fn report_fatal(err: &anyhow::Error) {
    match err.downcast_ref::<JenError>() {
        Some(jen_error @ (JenError::Config(_) | JenError::Timeout { .. } | JenError::Status { .. })) => {
            println!("{jen_error}");
        }
        _ => eprintln!("Error: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use tokio::net::TcpListener;

    #[test]
    fn test_history_job_only() {
        let cli = HistoryCli::try_parse_from(["jen-job-history", "main"]).unwrap();
        assert_eq!(cli.base_and_job(), (None, "main"));
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT);
        assert!(!cli.json);
    }

    #[test]
    fn test_history_base_and_job() {
        let cli = HistoryCli::try_parse_from([
            "jen-job-history",
            "http://ci:8080",
            "main",
            "-t",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.base_and_job(), (Some("http://ci:8080"), "main"));
        assert_eq!(cli.timeout, 30);
    }

    #[test]
    fn test_history_rejects_bad_timeout() {
        for value in ["0", "abc", "--timeout=-2"] {
            let args = if value.starts_with("--") {
                vec!["jen-job-history", "main", value]
            } else {
                vec!["jen-job-history", "main", "--timeout", value]
            };
            let err = HistoryCli::try_parse_from(args).unwrap_err();
            assert!(err.to_string().contains("is not a positive integer"), "{err}");
        }
    }

    #[test]
    fn test_history_requires_job() {
        assert!(HistoryCli::try_parse_from(["jen-job-history"]).is_err());
        assert!(HistoryCli::try_parse_from(["jen-job-history", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_compare_targets() {
        let cli = CompareCli::try_parse_from(["jen-compare", "main", "feature/20"]).unwrap();
        assert_eq!(cli.base_and_targets(), (None, "main", "feature/20"));
        assert!(!cli.monochrome);
        assert_eq!(cli.report_form(), ReportForm::Xml);

        let cli = CompareCli::try_parse_from([
            "jen-compare",
            "-m",
            "--html",
            "http://ci/job",
            "main",
            "feature/20",
        ])
        .unwrap();
        assert_eq!(
            cli.base_and_targets(),
            (Some("http://ci/job"), "main", "feature/20")
        );
        assert!(cli.monochrome);
        assert_eq!(cli.report_form(), ReportForm::Html);
    }

    #[test]
    fn test_compare_requires_two_targets() {
        assert!(CompareCli::try_parse_from(["jen-compare", "main"]).is_err());
        assert!(CompareCli::try_parse_from(["jen-compare", "a", "b", "c", "d"]).is_err());
    }

    #[tokio::test]
    async fn test_history_degrades_on_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/job/gone/api/json")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let url = server.url();
        let cli = HistoryCli::try_parse_from(["jen-job-history", url.as_str(), "gone"]).unwrap();

        let output = cli.history_output().await.unwrap();
        assert_eq!(output, Some(format!("404 Not Found: {url}/job/gone/api/json")));
        assert!(cli.execute().await.is_ok());
    }

    #[tokio::test]
    async fn test_history_degrades_on_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    drop(socket);
                });
            }
        });

        let base = format!("http://{addr}");
        let cli = HistoryCli::try_parse_from(["jen-job-history", "-t", "1", base.as_str(), "slow"])
            .unwrap();

        let output = cli.history_output().await.unwrap();
        assert_eq!(output, Some(format!("Timed out: {base}/job/slow/api/json")));
    }

    #[tokio::test]
    async fn test_history_prints_builds() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/job/main/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"builds":[{"number":5,"building":false,"timestamp":1700000000000,"duration":65000,"actions":[]}]}"#)
            .create_async()
            .await;

        let url = server.url();
        let cli = HistoryCli::try_parse_from(["jen-job-history", url.as_str(), "main"]).unwrap();
        let output = cli.history_output().await.unwrap().unwrap();
        assert!(output.starts_with("Build  Timestamp"), "{output}");
        assert!(output.contains("2023-11-14 22:13:20  1m05s"), "{output}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_invalid_json_is_fatal() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/job/main/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let url = server.url();
        let cli = HistoryCli::try_parse_from(["jen-job-history", url.as_str(), "main"]).unwrap();
        let err = cli.execute().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<JenError>(), Some(JenError::Json(_))));
    }

    #[tokio::test]
    async fn test_compare_aborts_on_http_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/job/main/testReport/api/xml")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let url = server.url();
        let cli =
            CompareCli::try_parse_from(["jen-compare", "-m", url.as_str(), "main", "other"]).unwrap();
        let err = cli.execute().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JenError>(),
            Some(JenError::Status { code: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_compare_fetches_left_then_right() {
        let mut server = Server::new_async().await;
        let left = server
            .mock("GET", "/job/main/testReport/api/xml")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<suite><case><className>A</className><name>t1</name><status>FAILED</status></case></suite>")
            .create_async()
            .await;
        let right = server
            .mock("GET", "/job/feature/testReport/api/xml")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<suite/>")
            .create_async()
            .await;

        let url = server.url();
        let cli = CompareCli::try_parse_from(["jen-compare", "-m", url.as_str(), "main", "feature"])
            .unwrap();
        assert!(cli.execute().await.is_ok());
        left.assert_async().await;
        right.assert_async().await;
    }
}
