use regex::Regex;
use log::debug;

use crate::utils::HoldupError;

/// URIs eligible for interception. Everything else is proxied without being held.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

pub(crate) fn make_re_list(str_re: &[String]) -> Result<Vec<Regex>, HoldupError> {
    let mut result: Vec<Regex> = Vec::with_capacity(str_re.len());
    for s in str_re {
        let re = Regex::new(s)
            .map_err(|e| HoldupError::ScopeError(format!("Cannot compile regex from '{}': {}", s, e)))?;
        result.push(re);
    }

    Ok(result)
}

fn fit_regex_list(s: &str, res: &[Regex]) -> bool {
    res.iter().any(|re| re.is_match(s))
}

fn fit_included(uri: &str, inc: &[Regex]) -> bool {
    inc.is_empty() || fit_regex_list(uri, inc)
}

/// Returns `true` if no matches found, `false` otherwise
fn fit_excluded(uri: &str, exc: &[Regex]) -> bool {
    !fit_regex_list(uri, exc)
}

impl Scope {
    pub(crate) fn new(include: &[String], exclude: &[String]) -> Result<Self, HoldupError> {
        Ok(Scope {
            include: make_re_list(include)?,
            exclude: make_re_list(exclude)?,
        })
    }

    pub(crate) fn fits(&self, uri: &str) -> bool {
        let fit = fit_included(uri, &self.include) && fit_excluded(uri, &self.exclude);
        debug!("URI {} in scope: {}", uri, fit);
        fit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_scope_takes_everything() {
        let scope = Scope::default();
        assert!(scope.fits("http://anything/at/all"));
    }

    #[test]
    fn include_narrows_and_exclude_wins() {
        let scope = Scope::new(
            &strings(&[r"^http://[^/]*example\.com/"]),
            &strings(&[r"\.(png|css|js)$"])
        ).unwrap();

        assert!(scope.fits("http://api.example.com/login"));
        assert!(!scope.fits("http://api.example.com/logo.png"));
        assert!(!scope.fits("http://other.org/"));
    }

    #[test]
    fn exclude_only() {
        let scope = Scope::new(&[], &strings(&["telemetry"])).unwrap();
        assert!(scope.fits("http://a/page"));
        assert!(!scope.fits("http://telemetry.a/ping"));
    }

    #[test]
    fn bad_regex_is_reported() {
        let err = Scope::new(&strings(&["(unclosed"]), &[]).unwrap_err();
        assert!(matches!(err, HoldupError::ScopeError(ref m) if m.contains("(unclosed")));
    }
}
