mod app;
mod comparator;
mod config;
mod data_source;
mod error;
mod github;
mod logging;
mod ranker;
mod report;
#[cfg(test)]
mod test_utils;

use app::App;
use clap::Parser;
use config::Config;
use data_source::Strategy;
use github::types::RepositoryRef;
use std::io::Write;

const USAGE: &str = "Usage: forkrank owner/repo";

#[derive(Parser)]
#[command(
    name = "forkrank",
    version,
    about = "List the forks of a GitHub repository that are ahead of it, best first"
)]
struct Cli {
    #[arg(value_name = "OWNER/REPO", help = "Repository whose forks are ranked")]
    repository: Option<String>,

    // anything after the repository is ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    rest: Vec<String>,
}

#[derive(Debug)]
enum Invocation {
    Run(RepositoryRef),
    /// `--help` / `--version`: clap prints and exits 0.
    Info(clap::Error),
    Usage(Option<String>),
}

fn invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => return Invocation::Info(e),
        Err(e) => return Invocation::Usage(Some(e.kind().to_string())),
    };
    let Some(target) = cli.repository else {
        return Invocation::Usage(None);
    };
    match RepositoryRef::parse(&target) {
        Ok(parent) => Invocation::Run(parent),
        Err(e) => Invocation::Usage(Some(e.to_string())),
    }
}

fn usage_error(detail: Option<&str>) -> ! {
    if let Some(detail) = detail {
        eprintln!("error: {detail}");
    }
    eprintln!("{USAGE}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let parent = match invocation(std::env::args_os()) {
        Invocation::Run(parent) => parent,
        Invocation::Info(e) => e.exit(),
        Invocation::Usage(detail) => usage_error(detail.as_deref()),
    };

    let config = Config::load();
    logging::init(&config.log_level);
    tracing::debug!(?config, "loaded config");

    if config.token().is_none() {
        if config.strategy == Some(Strategy::Api) {
            tracing::warn!("api strategy needs a token, falling back to scrape");
        }
        eprintln!(
            "note: GITHUB_TOKEN is not set, reading github.com pages without the API; export GITHUB_TOKEN=<token> for accurate results"
        );
    } else if config.strategy == Some(Strategy::Scrape) {
        tracing::info!("strategy forced to scrape, ignoring GITHUB_TOKEN");
    }

    let mut stdout = std::io::stdout().lock();
    rank_forks(&config, &parent, &mut stdout).await;
}

/// Runs the pipeline. Only usage errors are fatal, so failures here are
/// logged and the process still exits 0. Returns whether the table was written.
async fn rank_forks(config: &Config, parent: &RepositoryRef, out: &mut impl Write) -> bool {
    let sources = match data_source::init_sources(config) {
        Ok(sources) => sources,
        Err(e) => {
            tracing::error!(error = %e, "could not set up the GitHub client");
            return false;
        }
    };
    let app = App::new(sources, config.resolved_schedule());

    match app.run(parent, out).await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(repo = %parent, error = %e, "writing the report failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_detail(args: &[&str]) -> Option<String> {
        match invocation(args) {
            Invocation::Usage(detail) => detail,
            other => panic!("expected a usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_repository_runs() {
        match invocation(["forkrank", "acme/widget"]) {
            Invocation::Run(parent) => assert_eq!(parent.key(), "acme/widget"),
            other => panic!("expected a run, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_argument_is_usage_error() {
        assert_eq!(usage_detail(&["forkrank"]), None);
    }

    #[test]
    fn test_malformed_argument_is_usage_error() {
        let detail = usage_detail(&["forkrank", "acme"]).unwrap();
        assert!(detail.contains("acme"), "{detail}");
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        for args in [
            &["forkrank", "acme/widget", "extra"][..],
            &["forkrank", "acme/widget", "extra", "-x", "--more"][..],
        ] {
            assert!(matches!(invocation(args), Invocation::Run(p) if p.key() == "acme/widget"));
        }
    }

    #[test]
    fn test_unknown_flag_is_usage_error() {
        assert!(usage_detail(&["forkrank", "-x"]).is_some());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_logged_not_fatal() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/widget/network/members"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<a href="/alice/widget">widget</a>"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/alice/widget"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<div>This branch is 3 commits ahead of acme/widget:main.</div>"),
            )
            .mount(&server)
            .await;

        let config = Config {
            web_url: server.uri(),
            ..Config::default()
        };
        let parent = RepositoryRef::new("acme", "widget");

        assert!(!rank_forks(&config, &parent, &mut BrokenPipe).await);

        let mut out = Vec::new();
        assert!(rank_forks(&config, &parent, &mut out).await);
        assert_eq!(String::from_utf8(out).unwrap(), "alice/widget +3 -0\n");
    }

    #[test]
    fn test_help_and_version_are_not_usage_errors() {
        assert!(matches!(invocation(["forkrank", "--help"]), Invocation::Info(_)));
        assert!(matches!(invocation(["forkrank", "--version"]), Invocation::Info(_)));
    }
}
