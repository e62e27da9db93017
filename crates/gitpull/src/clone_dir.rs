/// Name of the directory `git clone <url>` creates when no destination is given.
///
/// Follows the git client's own rule: drop one trailing `/`, keep the last
/// `/`-delimited segment, keep the last `:`-delimited part of that (for
/// scp-like `host:path` remotes), then strip one `.git` or `.bundle` suffix.
/// Launch paths are built from this name, so any divergence from git sends
/// the user to a directory that does not exist.
pub fn derive_clone_directory_name(url: &str) -> &str {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let segment = segment.rsplit(':').next().unwrap_or(segment);

    segment
        .strip_suffix(".git")
        .or_else(|| segment.strip_suffix(".bundle"))
        .unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_url_with_git_suffix_and_trailing_slash() {
        assert_eq!(
            derive_clone_directory_name("https://example.com/org/repo.git/"),
            "repo"
        );
    }

    #[test]
    fn scp_like_remote() {
        assert_eq!(derive_clone_directory_name("git@host:org/repo.git"), "repo");
    }

    #[test]
    fn scp_like_remote_without_directory() {
        assert_eq!(derive_clone_directory_name("git@host:repo.git"), "repo");
    }

    #[test]
    fn plain_https_url() {
        assert_eq!(
            derive_clone_directory_name("https://github.com/acme/content"),
            "content"
        );
    }

    #[test]
    fn bundle_suffix_stripped() {
        assert_eq!(
            derive_clone_directory_name("/srv/backups/project.bundle"),
            "project"
        );
    }

    #[test]
    fn only_one_suffix_stripped() {
        assert_eq!(derive_clone_directory_name("https://h/x/repo.git.git"), "repo.git");
        assert_eq!(derive_clone_directory_name("https://h/x/repo.bundle.git"), "repo.bundle");
    }

    #[test]
    fn only_one_trailing_slash_stripped() {
        assert_eq!(derive_clone_directory_name("https://h/x/repo//"), "");
    }

    #[test]
    fn bare_name_is_unchanged() {
        for name in ["repo", "data-8", "materials-sp24"] {
            assert_eq!(derive_clone_directory_name(name), name);
            assert_eq!(
                derive_clone_directory_name(derive_clone_directory_name(name)),
                name
            );
        }
    }

    #[test]
    fn suffix_in_the_middle_is_kept() {
        assert_eq!(
            derive_clone_directory_name("https://h/x/repo.github.io"),
            "repo.github.io"
        );
    }
}
