use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;

use ldap2json::abstract_source::{ConnectionSettings, LdapSource, Result};
use ldap2json::extract::{discover_roots, extract_directory, ExtractConfig};
use ldap2json::file_format::{flat::FlatCollection, tree::Tree};
use ldap2json::file_utils::{human_size, write_document};
use ldap2json::logging::{init_logging, Verbosity};

/// Extract every object of an LDAP directory into a JSON namespace tree.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Ldap2JsonCli {
    /// Directory server URL, `ldap://host[:port]` or `ldaps://host[:port]`.
    /// Derived from --dc-ip when omitted.
    #[arg(long, env = "LDAP2JSON_URL")]
    url: Option<String>,

    /// IP address of the domain controller.
    #[arg(long, value_name = "IP ADDRESS")]
    dc_ip: Option<String>,

    /// Use LDAPS instead of LDAP when deriving the URL from --dc-ip.
    #[arg(long)]
    use_ldaps: bool,

    /// (FQDN) domain to authenticate to.
    #[arg(short, long, value_name = "DOMAIN")]
    domain: Option<String>,

    /// User to authenticate with.  Binds anonymously when omitted.
    #[arg(short, long, value_name = "USER")]
    user: Option<String>,

    /// Password to authenticate with.
    #[arg(short, long, env = "LDAP2JSON_PASSWORD", hide_env_values = true, default_value = "")]
    password: String,

    /// Only extract this naming root instead of every advertised one.
    #[arg(short, long, value_name = "DN")]
    base: Option<String>,

    /// Output JSON file.
    #[arg(short, long, default_value = "ldap.json")]
    outfile: String,

    /// Entries requested per result page.
    #[arg(long, default_value_t = 1000)]
    page_size: i32,

    /// Show no information at all.
    #[arg(short, long)]
    quiet: bool,

    /// Debug mode.
    #[arg(long)]
    debug: bool,
}

impl Ldap2JsonCli {
    fn server_url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        let scheme = if self.use_ldaps { "ldaps" } else { "ldap" };
        self.dc_ip
            .as_ref()
            .map(|dc_ip| format!("{}://{}", scheme, dc_ip))
    }

    fn bind_dn(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        Some(match &self.domain {
            Some(domain) => format!("{}@{}", user, domain),
            None => user.clone(),
        })
    }

    /// Said after a successful bind, in debug mode only.
    fn authentication_notice(&self) -> Option<&'static str> {
        match (self.debug, &self.user) {
            (true, Some(_)) => Some("[>] Authentication successful!"),
            _ => None,
        }
    }
}

/// Status lines for the user; silenced by --quiet.
struct Report {
    quiet: bool,
}

impl Report {
    fn line(&self, text: &str) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    fn start(&self, text: &str) {
        if !self.quiet {
            print!("{}", text);
            let _ = std::io::stdout().flush();
        }
    }
}

fn print_error(message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_intense(true);
    let _ = stderr.set_color(&spec);
    let _ = writeln!(stderr, "[!] {}", message);
    let _ = stderr.reset();
}

async fn run(cli: &Ldap2JsonCli, url: String, report: &Report) -> Result<()> {
    let settings = ConnectionSettings {
        url,
        bind_dn: cli.bind_dn(),
        password: cli.password.clone(),
    };

    report.start(&format!("[>] Connecting to '{}' ... ", settings.url));
    let mut source = LdapSource::connect(&settings).await?;
    report.line("done.");
    if let Some(notice) = cli.authentication_notice() {
        report.line(notice);
    }

    let config = ExtractConfig {
        page_size: cli.page_size,
        ..ExtractConfig::default()
    };

    report.line("[>] Extracting all objects from LDAP ...");
    let roots = discover_roots(&mut source, cli.base.as_deref()).await?;
    let mut flat = FlatCollection::new();
    let reports = extract_directory(&mut source, &roots, &config, &mut flat).await?;
    for root in &reports {
        if root.abandoned {
            report.line(&format!("  | Search filter rejected on {}, skipped", root.base));
        } else {
            debug!(base = %root.base, objects = root.objects, pages = root.pages, "extracted");
            if cli.debug {
                report.line(&format!(
                    "  | LDAP query {} returned {} objects on {}",
                    config.filter, root.objects, root.base
                ));
            }
        }
    }
    source.unbind().await?;

    let tree = Tree::from_flat(flat);
    report.line("[>] JSON data generated.");

    report.line(&format!("[>] Writing json data to {}", cli.outfile));
    let written = write_document(&cli.outfile, &tree)?;
    report.line(&format!("[>] Written {} to {}", human_size(written), cli.outfile));
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Ldap2JsonCli::parse();
    init_logging(Verbosity::from_flags(cli.quiet, cli.debug));

    let report = Report { quiet: cli.quiet };
    report.line("[+]======================================================");
    report.line(&format!(
        "[+]    LDAP2JSON v{}",
        env!("CARGO_PKG_VERSION")
    ));
    report.line("[+]======================================================");
    report.line("");

    let url = match cli.server_url() {
        Some(url) => url,
        None => {
            print_error("No directory server given, use --url or --dc-ip.");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, url, &report).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if !cli.quiet {
                println!();
            }
            print_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}
