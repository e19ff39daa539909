//! Operator regulatory domain override, read from a shell-style
//! `KEY=VALUE` file such as `/etc/default/wlan-regdomain`.

use std::path::PathBuf;

use wlcal_core::provision::RegdomainOverride;
use wlcal_core::RegulatoryDomain;

/// Value of `key` in shell-style `text`. The last assignment wins.
pub fn lookup<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let mut found = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        if k.trim_end() == key {
            found = Some(unquote(v.trim()));
        }
    }
    found
}

fn unquote(v: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = v.strip_prefix(q).and_then(|v| v.strip_suffix(q)) {
            return inner;
        }
    }
    // Unquoted values end at a trailing comment.
    match v.find(" #") {
        Some(i) => v[..i].trim_end(),
        None => v,
    }
}

pub struct OverrideFile {
    path: PathBuf,
    key: String,
}

impl OverrideFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl RegdomainOverride for OverrideFile {
    fn regdomain(&mut self) -> Option<RegulatoryDomain> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read regulatory override");
                return None;
            }
        };
        let value = lookup(&text, &self.key)?;
        if value.is_empty() {
            return None;
        }
        let domain = RegulatoryDomain::parse(value);
        if domain.is_none() {
            tracing::warn!(
                path = %self.path.display(),
                key = %self.key,
                value,
                "ignoring invalid regulatory override"
            );
        }
        domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Regulatory domain for the wireless interface.
#REGDOMAIN=US
OTHER=1
export REGDOMAIN="de"
"#;

    #[test]
    fn parses_shell_assignments() {
        assert_eq!(lookup(SAMPLE, "REGDOMAIN"), Some("de"));
        assert_eq!(lookup(SAMPLE, "OTHER"), Some("1"));
        assert_eq!(lookup(SAMPLE, "MISSING"), None);
        assert_eq!(lookup("REGDOMAIN='FI'", "REGDOMAIN"), Some("FI"));
        assert_eq!(lookup("REGDOMAIN = JP  # fixed", "REGDOMAIN"), Some("JP"));
        assert_eq!(lookup("A=1\nA=2\n", "A"), Some("2"));
        assert_eq!(lookup("REGDOMAIN_OLD=US", "REGDOMAIN"), None);
    }

    fn override_from(text: &str) -> Option<RegulatoryDomain> {
        let dir = std::env::temp_dir().join(format!(
            "wlcal-override-{}-{}",
            std::process::id(),
            text.len()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("wlan-regdomain");
        std::fs::write(&path, text).unwrap();
        let result = OverrideFile::new(&path, "REGDOMAIN").regdomain();
        std::fs::remove_dir_all(&dir).unwrap();
        result
    }

    #[test]
    fn file_override() {
        assert_eq!(override_from(SAMPLE), RegulatoryDomain::parse("DE"));
        assert_eq!(override_from("REGDOMAIN=\n"), None);
        assert_eq!(override_from("REGDOMAIN=USA\n"), None);
    }

    #[test]
    fn missing_file_is_no_override() {
        let mut src = OverrideFile::new("/nonexistent/wlan-regdomain", "REGDOMAIN");
        assert_eq!(src.regdomain(), None);
    }
}
