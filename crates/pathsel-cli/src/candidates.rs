//! # Candidate Files
//!
//! Path candidates come from an external discovery process that writes
//! them to a file, as a YAML (or JSON) list:
//!
//! ```yaml
//! - fingerprint: a1
//!   hops: [1, 1, 2]
//!   metrics:
//!     latency_ms: 50
//!     bandwidth_kbps: 10000
//! - fingerprint: b7
//!   hops: [1, 3]
//! ```
//!
//! Fingerprints must be unique within one file.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use pathsel_core::CandidateSet;

/// Parse a candidate list.
pub fn parse_candidates(bytes: &[u8], origin: &str) -> Result<CandidateSet> {
    let candidates: CandidateSet = serde_yaml::from_slice(bytes)
        .with_context(|| format!("failed to parse candidates from {origin}"))?;

    {
        let mut seen = HashSet::new();
        if let Some(dup) = candidates.iter().find(|c| !seen.insert(c.fingerprint.as_str())) {
            bail!("duplicate path fingerprint {} in {origin}", dup.fingerprint);
        }
    }
    Ok(candidates)
}

/// Read and parse a candidate file.
pub fn read_candidates(path: &Path) -> Result<CandidateSet> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read candidates file {}", path.display()))?;
    parse_candidates(&bytes, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LIST: &str = r#"
- fingerprint: a1
  hops: [1, 2]
  metrics:
    latency_ms: 50
- fingerprint: b7
  hops: [1, 3]
"#;

    #[test]
    fn parses_yaml_list() {
        let cs = parse_candidates(LIST.as_bytes(), "test").unwrap();
        assert_eq!(cs.len(), 2);
        assert_eq!(cs[0].metrics.latency_ms, Some(50));
        assert_eq!(cs[1].metrics.latency_ms, None);
    }

    #[test]
    fn parses_json_list() {
        let json = r#"[{"fingerprint": "x", "hops": [4]}]"#;
        let cs = parse_candidates(json.as_bytes(), "test").unwrap();
        assert_eq!(cs[0].fingerprint.as_str(), "x");
    }

    #[test]
    fn rejects_duplicates_and_bad_regions() {
        let dup = "- {fingerprint: a, hops: [1]}\n- {fingerprint: a, hops: [2]}\n";
        assert!(parse_candidates(dup.as_bytes(), "t").is_err());

        let zero = "- {fingerprint: a, hops: [0]}\n";
        assert!(parse_candidates(zero.as_bytes(), "t").is_err());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LIST.as_bytes()).unwrap();
        let cs = read_candidates(file.path()).unwrap();
        assert_eq!(cs.len(), 2);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_candidates(&dir.path().join("none.yml")).unwrap_err();
        assert!(format!("{err:#}").contains("none.yml"));
    }
}
