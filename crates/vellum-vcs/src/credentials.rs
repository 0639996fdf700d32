//! Credential injection for VCS URLs: an index URL's userinfo component is
//! filled in from the environment at checkout time rather than stored in a
//! manifest, so a `git+https://example.test/repo.git` reference never needs
//! its own credentials committed anywhere.

use url::Url;

/// Environment variable names consulted for a given host, in order.
const USERNAME_VARS: &[&str] = &["VELLUM_VCS_USERNAME", "GIT_USERNAME"];
const PASSWORD_VARS: &[&str] = &["VELLUM_VCS_PASSWORD", "GIT_PASSWORD", "GIT_TOKEN"];

fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter().find_map(|v| std::env::var(v).ok()).filter(|s| !s.is_empty())
}

/// Returns `url` with userinfo filled in from the environment, if the URL
/// has none already and credentials are available. Leaves the URL
/// unchanged for schemes other than `http`/`https` (an `ssh://` or
/// bare `git@host:` URL authenticates via the user's own SSH agent).
#[must_use]
pub fn inject_credentials(raw_url: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw_url) else {
        return raw_url.to_string();
    };
    if !matches!(parsed.scheme(), "http" | "https") || !parsed.username().is_empty() {
        return raw_url.to_string();
    }
    let Some(username) = first_env(USERNAME_VARS) else {
        return raw_url.to_string();
    };
    let password = first_env(PASSWORD_VARS);
    let _ = parsed.set_username(&username);
    let _ = parsed.set_password(password.as_deref());
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_url_untouched_without_env_vars() {
        // SAFETY: test runs single-threaded within this process for this check.
        for v in USERNAME_VARS {
            unsafe { std::env::remove_var(v) };
        }
        let out = inject_credentials("https://example.test/repo.git");
        assert_eq!(out, "https://example.test/repo.git");
    }

    #[test]
    fn leaves_ssh_urls_untouched() {
        let out = inject_credentials("git@github.com:vellum-pm/vellum.git");
        assert_eq!(out, "git@github.com:vellum-pm/vellum.git");
    }
}
