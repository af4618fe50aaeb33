//! Remote locations of the PHUSE-published pilot datasets

use serde::Deserialize;

/// Published revisions of the pilot study data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceRevision {
    /// Original pilot submission package.
    Original,
    /// Curated update of the pilot data, the most recent revision.
    #[default]
    Updated,
    /// Test Data Factory regeneration.
    Tdf,
}

impl SourceRevision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Updated => "updated",
            Self::Tdf => "tdf",
        }
    }
}

/// One URL prefix per revision, passed to the converter at construction.
///
/// Each prefix serves `{domain}.xpt` transport files directly beneath it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub original: String,
    pub updated: String,
    pub tdf: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            original:
                "https://github.com/phuse-org/phuse-scripts/raw/master/data/sdtm/cdiscpilot01/"
                    .to_string(),
            updated:
                "https://github.com/phuse-org/phuse-scripts/raw/master/data/sdtm/updated_cdiscpilot/"
                    .to_string(),
            tdf: "https://github.com/phuse-org/phuse-scripts/raw/master/data/sdtm/TDF_SDTM_v1.0/"
                .to_string(),
        }
    }
}

impl SourceConfig {
    pub fn prefix(&self, revision: SourceRevision) -> &str {
        match revision {
            SourceRevision::Original => &self.original,
            SourceRevision::Updated => &self.updated,
            SourceRevision::Tdf => &self.tdf,
        }
    }

    /// Transport-file URL for a domain, e.g. `DM` → `{prefix}dm.xpt`.
    pub fn dataset_url(&self, revision: SourceRevision, domain: &str) -> String {
        format!(
            "{}{}.xpt",
            self.prefix(revision),
            domain.to_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_url_lowercases_domain() {
        let sources = SourceConfig::default();
        let url = sources.dataset_url(SourceRevision::Original, "DM");
        assert!(url.ends_with("/cdiscpilot01/dm.xpt"));
    }

    #[test]
    fn default_revision_is_updated() {
        assert_eq!(SourceRevision::default(), SourceRevision::Updated);
    }

    #[test]
    fn prefixes_end_with_separator() {
        let sources = SourceConfig::default();
        for revision in [
            SourceRevision::Original,
            SourceRevision::Updated,
            SourceRevision::Tdf,
        ] {
            assert!(sources.prefix(revision).ends_with('/'));
        }
    }
}
