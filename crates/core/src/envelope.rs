//! Response envelope for a `Resolution`, rendered as JSON or XML.

use std::borrow::Cow;

use serde::Serialize;

use crate::aggregator::WorkId;
use crate::error::RenderError;
use crate::platform::PlatformReference;
use crate::resolve::Resolution;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const XML_ROOT: &str = "lookup";

/// JSON envelope. Null fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEnvelope {
    pub message: &'static str,
    pub original_query: Option<String>,
    pub parsed_query: Option<PlatformReference>,
    pub data: Option<EnvelopeData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeData {
    pub title: String,
    pub thumbnail: String,
    /// Canonical watch URL rebuilt from the parsed reference.
    pub url: String,
    pub otodb_id: Option<WorkId>,
}

impl From<&Resolution> for LookupEnvelope {
    fn from(resolution: &Resolution) -> Self {
        let data = match (resolution.outcome.metadata(), &resolution.parsed_query) {
            (Some(meta), Some(reference)) => Some(EnvelopeData {
                title: meta.title.clone(),
                thumbnail: meta.thumbnail.clone(),
                url: reference.watch_url(),
                otodb_id: meta.canonical_id,
            }),
            _ => None,
        };
        Self {
            message: resolution.outcome.message(),
            original_query: resolution.original_query.clone(),
            parsed_query: resolution.parsed_query.clone(),
            data,
        }
    }
}

// XML omits null fields instead of writing empty elements.
#[derive(Serialize)]
struct XmlEnvelope<'a> {
    message: &'static str,
    #[serde(rename = "originalQuery", skip_serializing_if = "Option::is_none")]
    original_query: Option<Cow<'a, str>>,
    #[serde(rename = "parsedQuery", skip_serializing_if = "Option::is_none")]
    parsed_query: Option<XmlReference<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<XmlData<'a>>,
}

#[derive(Serialize)]
struct XmlReference<'a> {
    platform: &'static str,
    id: Cow<'a, str>,
}

#[derive(Serialize)]
struct XmlData<'a> {
    title: Cow<'a, str>,
    thumbnail: Cow<'a, str>,
    url: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    otodb_id: Option<WorkId>,
}

/// Characters XML 1.0 does not allow anywhere in a document.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

/// Replaces characters XML cannot carry with U+FFFD.
fn xml_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().map(|c| if is_xml_char(c) { c } else { '\u{FFFD}' }).collect())
    }
}

impl LookupEnvelope {
    pub fn to_json_pretty(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_xml(&self) -> Result<String, RenderError> {
        let view = XmlEnvelope {
            message: self.message,
            original_query: self.original_query.as_deref().map(xml_text),
            parsed_query: self.parsed_query.as_ref().map(|r| XmlReference {
                platform: r.platform.as_str(),
                id: xml_text(&r.id),
            }),
            data: self.data.as_ref().map(|d| XmlData {
                title: xml_text(&d.title),
                thumbnail: xml_text(&d.thumbnail),
                url: xml_text(&d.url),
                otodb_id: d.otodb_id,
            }),
        };
        let body = quick_xml::se::to_string_with_root(XML_ROOT, &view)
            .map_err(|e| RenderError::Xml(e.to_string()))?;
        Ok(format!("{}\n{}", XML_DECLARATION, body))
    }
}
