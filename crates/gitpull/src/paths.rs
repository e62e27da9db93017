//! Path conventions of the notebook server's pull endpoint.
//!
//! These mirror what the server does with a `git-pull` request, so a client
//! can predict where the user ends up without asking the server.

use url::form_urlencoded;

use crate::form::LinkError;

/// Target directory used when the request has no `targetpath`: the last `/`
/// segment of the repository URL, unchanged.
pub fn default_target_path(repo: &str) -> &str {
    repo.rsplit('/').next().unwrap_or(repo)
}

/// In-app path the server redirects to after a pull without `urlpath`.
///
/// `parent_dir`, `target_path` and `sub_path` are joined (empty and `.`
/// components dropped). JupyterLab gets `lab/tree/`, notebooks get
/// `notebooks/`, everything else `tree/`. Archives always land on `tree/`.
pub fn default_launch_path(
    parent_dir: &str,
    target_path: &str,
    sub_path: &str,
    app: Option<&str>,
    archive: bool,
) -> String {
    if archive {
        return "tree/".to_owned();
    }

    let path = [parent_dir, target_path, sub_path]
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if app.is_some_and(|a| a.eq_ignore_ascii_case("lab")) {
        format!("lab/tree/{path}")
    } else if path.to_lowercase().ends_with(".ipynb") {
        format!("notebooks/{path}")
    } else {
        format!("tree/{path}")
    }
}

/// Rewrite a legacy `interact?repo=..&account=..&branch=..&path=..` query
/// into the equivalent `git-pull` URL under `base_url`.
pub fn legacy_interact_redirect(base_url: &str, query: &str) -> Result<String, LinkError> {
    let mut repo = None;
    let mut account = "data-8".to_owned();
    let mut branch = "gh-pages".to_owned();
    let mut path = ".".to_owned();

    let query = query.strip_prefix('?').unwrap_or(query);
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "repo" if !value.is_empty() => repo = Some(value.into_owned()),
            "account" if !value.is_empty() => account = value.into_owned(),
            "branch" if !value.is_empty() => branch = value.into_owned(),
            "path" if !value.is_empty() => path = value.into_owned(),
            _ => {}
        }
    }

    let repo = repo.ok_or(LinkError::Missing("repo"))?;
    let repo_url = format!("https://github.com/{account}/{repo}");

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("repo", &repo_url)
        .append_pair("branch", &branch)
        .append_pair("subPath", &path)
        .finish();

    Ok(format!("{base_url}git-pull?{query}"))
}
