//! Documents cited by a grounded answer.

use ai_llm_service::GroundingSource;
use serde::{Deserialize, Serialize};

/// Browser-facing reference to a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// `"[i] <title>"`, numbered from 1 in citation order.
    pub name: String,
    /// Name as shown to users, see [`display_name`].
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snippets: Vec<String>,
}

/// Numbered references for the grounding sources of one answer.
pub fn documents_from_sources(sources: &[GroundingSource]) -> Vec<DocumentRef> {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let name = format!("[{}] {}", i + 1, s.title);
            DocumentRef {
                label: display_name(&name),
                name,
                url: document_url(&s.uri),
                snippets: Vec::new(),
            }
        })
        .collect()
}

/// Maps `gs://bucket/object` to its authenticated browser URL
/// (`https://storage.mtls.cloud.google.com/bucket/object`), percent-encoding the
/// object name. Other URIs are returned unchanged.
pub fn document_url(uri: &str) -> String {
    let Some(rest) = uri.strip_prefix("gs://") else {
        return uri.to_string();
    };
    let (bucket, object) = rest.split_once('/').unwrap_or((rest, ""));
    let object = object
        .split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("https://storage.mtls.cloud.google.com/{bucket}/{object}")
}

/// Display form of a reference name: leading digits of the title word are
/// dropped (`"[2] 2023annual.pdf"` -> `"[2] annual.pdf"`). A word made only of
/// digits is kept as is.
pub fn display_name(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    if let Some(title) = words.get_mut(1) {
        let trimmed = title.trim_start_matches(|c: char| c.is_numeric());
        if !trimmed.is_empty() {
            *title = trimmed;
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gs_uri_becomes_browser_url() {
        assert_eq!(
            document_url("gs://dbhackathon_input_acme/reports/2023 annual report.pdf"),
            "https://storage.mtls.cloud.google.com/dbhackathon_input_acme/reports/2023%20annual%20report.pdf"
        );
    }

    #[test]
    fn tilde_and_slash_survive_encoding() {
        assert_eq!(
            document_url("gs://b/a~b/c.pdf"),
            "https://storage.mtls.cloud.google.com/b/a~b/c.pdf"
        );
    }

    #[test]
    fn non_gs_uri_unchanged() {
        assert_eq!(document_url("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn numbering_starts_at_one() {
        let docs = documents_from_sources(&[
            GroundingSource {
                title: "10k.pdf".into(),
                uri: "gs://docs/10k.pdf".into(),
            },
            GroundingSource {
                title: "letter.pdf".into(),
                uri: "gs://docs/letter.pdf".into(),
            },
        ]);
        assert_eq!(docs[0].name, "[1] 10k.pdf");
        assert_eq!(docs[0].label, "[1] k.pdf");
        assert_eq!(docs[1].name, "[2] letter.pdf");
        assert_eq!(docs[1].url, "https://storage.mtls.cloud.google.com/docs/letter.pdf");
    }

    #[test]
    fn display_name_drops_leading_digits() {
        assert_eq!(display_name("[1] 10k.pdf"), "[1] k.pdf");
        assert_eq!(display_name("[2] 2023annual report.pdf"), "[2] annual report.pdf");
        assert_eq!(display_name("[3] 2023"), "[3] 2023");
        assert_eq!(display_name("[4]"), "[4]");
    }
}
