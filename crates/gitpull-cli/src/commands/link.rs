use anyhow::Result;
use clap::Args;
use gitpull::{LaunchMode, LinkForm, ProvisioningRequest, build_url};

use crate::config::AppConfig;

#[derive(Args, Debug, Default)]
pub struct LinkArgs {
    /// Hub URL (defaults to `hub_url`, or `binder_url` in binder mode)
    #[arg(long)]
    pub hub: Option<String>,
    /// Content repository; in binder mode, the environment repository
    #[arg(long)]
    pub repo: Option<String>,
    #[arg(long)]
    pub branch: Option<String>,
    /// Archive provider (googledrive, dropbox, web); omit for git
    #[arg(long)]
    pub provider: Option<String>,
    /// Application to open (classic, jupyterlab, shiny, rstudio, custom)
    #[arg(long)]
    pub app: Option<String>,
    /// File or folder to open, relative to the pulled content
    #[arg(long)]
    pub file_path: Option<String>,
    /// Literal in-app path; implies `--app custom`
    #[arg(long)]
    pub urlpath: Option<String>,
    /// direct, canvas or binder
    #[arg(long)]
    pub mode: Option<String>,
    /// Content repository pulled after a binder launch
    #[arg(long)]
    pub content_repo: Option<String>,
    #[arg(long)]
    pub content_branch: Option<String>,
    /// Prefill from a link-generator query string; flags override it
    #[arg(long)]
    pub from_query: Option<String>,
    /// Print the link for every available mode
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: LinkArgs, config: &AppConfig) -> Result<()> {
    let all = args.all;
    let request = build_form(args, config).into_request()?;

    if all {
        for (label, url) in every_mode(&request) {
            println!("{label:<7} {url}");
        }
    } else {
        println!("{}", build_url(&request));
    }

    Ok(())
}

/// Flags win over the query prefill; config fills whatever is still empty.
fn build_form(args: LinkArgs, config: &AppConfig) -> LinkForm {
    let mut form = args
        .from_query
        .as_deref()
        .map(LinkForm::from_query)
        .unwrap_or_default();

    let fields = [
        (&mut form.hub, args.hub),
        (&mut form.repo, args.repo),
        (&mut form.branch, args.branch),
        (&mut form.provider, args.provider),
        (&mut form.app, args.app),
        (&mut form.file_path, args.file_path),
        (&mut form.urlpath, args.urlpath),
        (&mut form.mode, args.mode),
        (&mut form.content_repo, args.content_repo),
        (&mut form.content_branch, args.content_branch),
    ];
    for (field, flag) in fields {
        if let Some(value) = flag {
            *field = value;
        }
    }

    if !form.urlpath.is_empty() {
        form.app = "custom".to_owned();
    }
    if form.app.is_empty()
        && let Some(app) = &config.app
    {
        form.app = app.clone();
    }
    if form.hub.is_empty() {
        let fallback = if form.mode.trim() == "binder" {
            Some(config.binder_url().to_owned())
        } else {
            config.hub_url.clone()
        };
        form.hub = fallback.unwrap_or_default();
    }

    form
}

/// The request's link under each launch mode it can be expressed in.
fn every_mode(request: &ProvisioningRequest) -> Vec<(&'static str, String)> {
    let mut modes = vec![LaunchMode::Direct, LaunchMode::Lti];
    if let LaunchMode::Binder(env) = request.mode() {
        modes.push(LaunchMode::Binder(env.clone()));
    }

    modes
        .into_iter()
        .map(|mode| {
            let label = mode.label();
            (label, build_url(&request.clone().with_mode(mode)))
        })
        .collect()
}
