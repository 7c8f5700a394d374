//! `lanchr search`: match services by label, program, descriptor path, or
//! arguments.

use anyhow::{Context, Result};
use clap::Args;
use regex::{Regex, RegexBuilder};

use lanchr_core::Service;

use super::list::{print_services_json, print_services_table};
use super::{scanner, Output};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for. Case-insensitive substring unless a mode flag is set.
    pub query: String,

    /// Treat the query as a regular expression.
    #[arg(long, conflicts_with = "path")]
    pub regex: bool,

    /// Match program and descriptor paths against a `*` glob.
    #[arg(long)]
    pub path: bool,
}

impl SearchArgs {
    pub fn run(self, out: Output) -> Result<()> {
        let matcher = Matcher::new(&self.query, self.regex, self.path)?;
        let mut services: Vec<Service> = scanner()?
            .scan_all()
            .context("failed to scan services")?
            .into_iter()
            .filter(|s| matcher.matches(s))
            .collect();
        services.sort_by(|a, b| a.label.cmp(&b.label));

        if out.json {
            return print_services_json(&services);
        }
        print_services_table(&services);
        Ok(())
    }
}

enum Matcher {
    Substring(String),
    Pattern(Regex),
    Glob(Regex),
}

impl Matcher {
    fn new(query: &str, regex: bool, path: bool) -> Result<Self> {
        if regex {
            let pattern =
                Regex::new(query).with_context(|| format!("invalid regex {query:?}"))?;
            return Ok(Matcher::Pattern(pattern));
        }
        if path {
            return Ok(Matcher::Glob(glob_regex(query)?));
        }
        Ok(Matcher::Substring(query.to_lowercase()))
    }

    fn matches(&self, service: &Service) -> bool {
        let plist = service
            .plist_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let binary = service.binary_path().unwrap_or("");

        match self {
            Matcher::Substring(needle) => {
                let args = service.program_arguments.join(" ");
                [service.label.as_str(), binary, plist.as_str(), args.as_str()]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str()))
            }
            Matcher::Pattern(re) => {
                let args = service.program_arguments.join(" ");
                [service.label.as_str(), binary, plist.as_str(), args.as_str()]
                    .iter()
                    .any(|field| re.is_match(field))
            }
            Matcher::Glob(re) => [binary, plist.as_str()]
                .iter()
                .any(|field| !field.is_empty() && re.is_match(field)),
        }
    }
}

/// Case-insensitive glob: `*` matches any run of characters. A query without
/// `*` matches as a substring.
fn glob_regex(query: &str) -> Result<Regex> {
    let body = query
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let pattern = if query.contains('*') {
        format!("^{body}$")
    } else {
        body
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid path pattern {query:?}"))
}
