// Repository identifiers
//
// Accepts `owner/name`, `https://host/owner/name(.git)` and
// `git@host:owner/name(.git)`; everything is reduced to a clone URL plus a
// deterministic cache key.

use crate::error::{Error, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Host assumed for `owner/name` shorthand when computing cache keys
const DEFAULT_HOST: &str = "github.com";

/// A parsed repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoIdentifier {
    /// Input as given, trimmed
    raw: String,
    owner: Option<String>,
    name: String,
    /// Full remote URL when the input was one
    url: Option<String>,
}

impl RepoIdentifier {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(Error::invalid_input("repository identifier is required"));
        }

        let trimmed = raw.trim_end_matches('/');

        if let Some(rest) = scp_path(trimmed) {
            let (owner, name) = split_owner_name(rest, raw)?;
            return Ok(Self {
                raw: raw.to_string(),
                owner,
                name,
                url: Some(trimmed.to_string()),
            });
        }

        if let Some(idx) = trimmed.find("://") {
            let after_scheme = &trimmed[idx + 3..];
            let path = after_scheme
                .split_once('/')
                .map(|(_, p)| p)
                .ok_or_else(|| Error::invalid_input(format!("no repository path in {}", raw)))?;
            let (owner, name) = split_owner_name(path, raw)?;
            return Ok(Self {
                raw: raw.to_string(),
                owner,
                name,
                url: Some(trimmed.to_string()),
            });
        }

        // bare owner/name shorthand
        let parts: Vec<&str> = trimmed.split('/').collect();
        match parts.as_slice() {
            [owner, name] if valid_segment(owner) && valid_segment(name) => Ok(Self {
                raw: raw.to_string(),
                owner: Some(owner.to_string()),
                name: strip_git_suffix(name).to_string(),
                url: None,
            }),
            _ => Err(Error::invalid_input(format!(
                "expected owner/name or a repository URL, got {}",
                raw
            ))),
        }
    }

    /// Repository name; also the label shown for the graph root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// `owner/name` when the owner is known
    pub fn slug(&self) -> Option<String> {
        self.owner.as_ref().map(|o| format!("{}/{}", o, self.name))
    }

    pub fn is_shorthand(&self) -> bool {
        self.url.is_none()
    }

    /// URL to clone; shorthand identifiers are resolved against `base_url`
    pub fn clone_url(&self, base_url: &str) -> String {
        match (&self.url, &self.owner) {
            (Some(url), _) => url.clone(),
            (None, Some(owner)) => format!(
                "{}/{}/{}.git",
                base_url.trim_end_matches('/'),
                owner,
                self.name
            ),
            (None, None) => format!("{}/{}.git", base_url.trim_end_matches('/'), self.name),
        }
    }

    /// Directory name under the cache root: `{name}-{12 hex chars}`.
    ///
    /// Shorthand, HTTPS and scp forms of one repository share a key.
    pub fn cache_key(&self) -> String {
        let digest = format!("{:x}", Sha256::digest(self.canonical_remote().as_bytes()));
        format!("{}-{}", sanitize(&self.name).to_ascii_lowercase(), &digest[..12])
    }

    /// Lowercase `host/owner/name` with scheme, user and `.git` removed
    fn canonical_remote(&self) -> String {
        let (host, path) = match &self.url {
            Some(url) => match scp_path(url) {
                Some(path) => {
                    let user_host = url.split_once(':').map_or("", |(uh, _)| uh);
                    (host_of(user_host), path)
                }
                None => {
                    let rest = url.split_once("://").map_or(url.as_str(), |(_, r)| r);
                    let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
                    (host_of(authority), path)
                }
            },
            None => (DEFAULT_HOST, ""),
        };

        let mut segments: Vec<&str> = Vec::new();
        if !host.is_empty() {
            segments.push(host);
        }
        match &self.url {
            Some(_) => segments.extend(path.split('/').filter(|s| !s.is_empty())),
            None => {
                if let Some(owner) = &self.owner {
                    segments.push(owner);
                }
                segments.push(&self.name);
            }
        }

        strip_git_suffix(&segments.join("/")).to_ascii_lowercase()
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Path part of `user@host:path`, if the input has that shape
fn scp_path(s: &str) -> Option<&str> {
    if s.contains("://") {
        return None;
    }
    let (user_host, path) = s.split_once(':')?;
    if user_host.contains('@') && !user_host.contains('/') {
        Some(path)
    } else {
        None
    }
}

fn split_owner_name(path: &str, raw: &str) -> Result<(Option<String>, String)> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let name = segments
        .last()
        .map(|n| strip_git_suffix(n))
        .filter(|n| valid_segment(n))
        .ok_or_else(|| Error::invalid_input(format!("no repository name in {}", raw)))?;
    let owner = if segments.len() >= 2 {
        Some(segments[segments.len() - 2].to_string())
    } else {
        None
    };
    Ok((owner, name.to_string()))
}

/// Host part of an authority, without any `user@` prefix
fn host_of(authority: &str) -> &str {
    authority.rsplit('@').next().unwrap_or(authority)
}

fn strip_git_suffix(s: &str) -> &str {
    s.strip_suffix(".git").unwrap_or(s)
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s.chars().all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`
pub(crate) fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let id = RepoIdentifier::parse("octo/demo").unwrap();
        assert_eq!(id.owner(), Some("octo"));
        assert_eq!(id.name(), "demo");
        assert!(id.is_shorthand());
        assert_eq!(
            id.clone_url("https://github.com"),
            "https://github.com/octo/demo.git"
        );
        assert_eq!(
            id.clone_url("https://git.example.com/"),
            "https://git.example.com/octo/demo.git"
        );
    }

    #[test]
    fn test_parse_https_url() {
        let id = RepoIdentifier::parse("https://github.com/octo/demo.git").unwrap();
        assert_eq!(id.owner(), Some("octo"));
        assert_eq!(id.name(), "demo");
        assert!(!id.is_shorthand());
        assert_eq!(id.clone_url("ignored"), "https://github.com/octo/demo.git");
        assert_eq!(id.slug().as_deref(), Some("octo/demo"));
    }

    #[test]
    fn test_parse_url_trailing_slash() {
        let id = RepoIdentifier::parse("  https://github.com/octo/demo/  ").unwrap();
        assert_eq!(id.name(), "demo");
        assert_eq!(id.to_string(), "https://github.com/octo/demo/");
    }

    #[test]
    fn test_parse_scp_url() {
        let id = RepoIdentifier::parse("git@github.com:octo/demo.git").unwrap();
        assert_eq!(id.owner(), Some("octo"));
        assert_eq!(id.name(), "demo");
        assert_eq!(id.clone_url("x"), "git@github.com:octo/demo.git");
    }

    #[test]
    fn test_parse_file_url() {
        let id = RepoIdentifier::parse("file:///srv/git/demo.git").unwrap();
        assert_eq!(id.name(), "demo");
        assert_eq!(id.owner(), Some("git"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        for bad in ["", "   ", "demo", "a/b/c", "octo/", "../etc", "https://github.com", "octo/de mo"] {
            let err = RepoIdentifier::parse(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{}", bad);
        }
    }

    #[test]
    fn test_cache_key_deterministic() {
        let a = RepoIdentifier::parse("octo/demo").unwrap();
        let b = RepoIdentifier::parse("octo/demo").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.cache_key().starts_with("demo-"));
        assert_eq!(a.cache_key().len(), "demo-".len() + 12);
    }

    #[test]
    fn test_cache_key_separates_owners() {
        let a = RepoIdentifier::parse("alice/demo").unwrap();
        let b = RepoIdentifier::parse("bob/demo").unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_git_suffix_and_case() {
        let a = RepoIdentifier::parse("https://github.com/Octo/Demo.git").unwrap();
        let b = RepoIdentifier::parse("https://github.com/octo/demo").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.cache_key().starts_with("demo-"));
    }

    #[test]
    fn test_cache_key_same_across_forms() {
        let forms = [
            "octo/demo",
            "https://github.com/octo/demo",
            "https://github.com/octo/demo.git/",
            "git@github.com:octo/demo.git",
            "ssh://git@github.com/octo/demo.git",
            "Octo/Demo",
        ];
        let expected = RepoIdentifier::parse(forms[0]).unwrap().cache_key();
        for form in forms {
            assert_eq!(RepoIdentifier::parse(form).unwrap().cache_key(), expected, "{}", form);
        }
    }

    #[test]
    fn test_cache_key_separates_hosts() {
        let a = RepoIdentifier::parse("https://github.com/octo/demo").unwrap();
        let b = RepoIdentifier::parse("https://gitlab.com/octo/demo").unwrap();
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_canonical_remote() {
        let id = RepoIdentifier::parse("git@GitHub.com:Octo/Demo.git").unwrap();
        assert_eq!(id.canonical_remote(), "github.com/octo/demo");
        let id = RepoIdentifier::parse("file:///srv/git/demo.git").unwrap();
        assert_eq!(id.canonical_remote(), "srv/git/demo");
    }
}
