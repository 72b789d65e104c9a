//! Clipboard paste pipeline.
//!
//! Takes everything a paste event carries (HTML, plain text, RTF and an
//! optional dropped file) and produces one self-contained HTML fragment.

use std::sync::{Arc, LazyLock};

use html_escape::encode_double_quoted_attribute;
use regex::Regex;
use tracing::{debug, warn};

use crate::codec::{data_uri, detect_signature};
use crate::error::Result;
use crate::image::ImageType;
use crate::reconcile::{Diagnostic, Reconciler};

use super::builder::PasteProcessorBuilder;
use super::options::PasteOptions;

static LEADING_META: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<meta.*?>").unwrap());

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body(?:.*?)>(.*)</body>").unwrap());

static FRAGMENT_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*<!--StartFragment-->|<!--EndFragment-->\s*").unwrap());

static GENERATOR_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+name=["']?generator["']?\s+content=["']?(\w+)"#).unwrap()
});

static OFFICE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(class="?Mso|style=["'][^"]*?\bmso-|w:WordDocument|<o:\w+>|</font>)"#).unwrap()
});

/// Application that produced an HTML payload, from its generator meta tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Microsoft,
    LibreOffice,
    Unknown,
}

/// A file dropped or pasted together with the clipboard data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    /// MIME type reported by the host; may be empty.
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Everything a paste event carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
    pub rtf: Option<String>,
    pub file: Option<DroppedFile>,
}

/// Result of processing a paste.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasteOutput {
    pub html: String,
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Keep only the fragment of a clipboard HTML document.
///
/// Drops a leading `<meta>` tag, keeps the `<body>` content when there is a
/// body, and removes the `StartFragment`/`EndFragment` comments.
pub fn strip_html(html: &str) -> String {
    let html = LEADING_META.replace(html, "");
    if let Some(body) = BODY.captures(&html).and_then(|caps| caps.get(1)) {
        return FRAGMENT_MARKERS.replace_all(body.as_str(), "").into_owned();
    }
    html.into_owned()
}

/// Producer named by the `<meta name="generator">` tag, if there is one.
pub fn content_generator(html: &str) -> Option<Generator> {
    let name = GENERATOR_META.captures(html)?.get(1)?.as_str().to_lowercase();
    Some(if name.starts_with("microsoft") {
        Generator::Microsoft
    } else if name.starts_with("libreoffice") {
        Generator::LibreOffice
    } else {
        Generator::Unknown
    })
}

/// Whether HTML was produced by Word, by generator tag or Office markup.
pub fn is_office_content(html: &str) -> bool {
    match content_generator(html) {
        Some(generator) => generator == Generator::Microsoft,
        None => OFFICE_MARKUP.is_match(html),
    }
}

/// Turns clipboard payloads into self-contained HTML.
#[derive(Debug, Clone, Default)]
pub struct PasteProcessor {
    reconciler: Reconciler,
    options: PasteOptions,
}

impl PasteProcessor {
    /// Processor with the built-in encoder and no resource resolver.
    pub fn new(options: PasteOptions) -> Self {
        PasteProcessorBuilder::new().options(options).build()
    }

    pub fn builder() -> PasteProcessorBuilder {
        PasteProcessorBuilder::new()
    }

    pub(crate) fn from_parts(reconciler: Reconciler, options: PasteOptions) -> Self {
        Self {
            reconciler,
            options,
        }
    }

    pub fn options(&self) -> &PasteOptions {
        &self.options
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Whether a payload comes from Word and needs this processor.
    pub fn is_office_paste(payload: &ClipboardPayload) -> bool {
        !payload.html.is_empty() && is_office_content(&payload.html)
    }

    /// Process one paste.
    ///
    /// A dropped file wins over the clipboard HTML unless
    /// [`PasteOptions::ignore_single_file`] is set. When the result is
    /// empty the plain text is used instead.
    pub async fn process(&self, payload: ClipboardPayload) -> Result<PasteOutput> {
        let ClipboardPayload {
            html,
            text,
            rtf,
            file,
        } = payload;

        if let Some(file) = file.filter(|_| !self.options.ignore_single_file) {
            debug!(name = %file.name, mime = %file.mime, "pasting dropped file");
            let html = self.file_html(&file).await;
            return Ok(PasteOutput {
                html: if html.is_empty() { text.clone() } else { html },
                text,
                diagnostics: Vec::new(),
            });
        }

        let html = strip_html(&html);
        let reconciled = self.reconciler.reconcile(&html, rtf.as_deref()).await?;
        let html = if reconciled.html.is_empty() {
            text.clone()
        } else {
            reconciled.html
        };

        Ok(PasteOutput {
            html,
            text,
            diagnostics: reconciled.diagnostics,
        })
    }

    /// HTML for a dropped file: supported images become an `<img>` tag,
    /// anything else its data URI.
    async fn file_html(&self, file: &DroppedFile) -> String {
        let mut image_type = ImageType::from_mime(&file.mime);
        if file.mime.is_empty() {
            image_type = detect_signature(&file.bytes);
        }

        if !image_type.is_supported() {
            let mime = if file.mime.is_empty() {
                "application/octet-stream"
            } else {
                file.mime.as_str()
            };
            return data_uri(mime, &file.bytes);
        }

        let bytes: Arc<[u8]> = Arc::from(file.bytes.as_slice());
        let encoded = self
            .reconciler
            .bounded(
                &file.name,
                self.reconciler.encoder().encode(bytes, image_type),
            )
            .await;
        match encoded {
            Ok(Some(src)) => format!(r#"<img src="{}" />"#, encode_double_quoted_attribute(&src)),
            Ok(None) => {
                warn!(name = %file.name, "image handler returned nothing for dropped file");
                String::new()
            }
            Err(e) => {
                warn!(name = %file.name, error = %e, "dropped file not encoded");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_keeps_body() {
        let html = "<meta charset='utf-8'><html><head><title>x</title></head><body lang=EN>\r\n<!--StartFragment--><p>Hi</p><!--EndFragment-->\r\n</body></html>";
        assert_eq!(strip_html(html), "<p>Hi</p>");
    }

    #[test]
    fn test_strip_html_without_body() {
        assert_eq!(strip_html("<meta charset='utf-8'><b>x</b>"), "<b>x</b>");
        assert_eq!(strip_html("<b>x</b>"), "<b>x</b>");
    }

    #[test]
    fn test_content_generator() {
        let word = r#"<meta name=Generator content="Microsoft Word 15">"#;
        assert_eq!(content_generator(word), Some(Generator::Microsoft));
        let libre = r#"<meta name="generator" content="LibreOffice/7.4"/>"#;
        assert_eq!(content_generator(libre), Some(Generator::LibreOffice));
        let other = r#"<meta name="generator" content="Pages"/>"#;
        assert_eq!(content_generator(other), Some(Generator::Unknown));
        assert_eq!(content_generator("<p>x</p>"), None);
    }

    #[test]
    fn test_is_office_content() {
        assert!(is_office_content(r#"<p class=MsoNormal>x</p>"#));
        assert!(is_office_content(r#"<p style="margin:0;mso-line-height:1">x</p>"#));
        assert!(is_office_content("<o:p></o:p>"));
        assert!(!is_office_content("<p>plain</p>"));
        let libre = r#"<meta name="generator" content="LibreOffice"/><p class=MsoNormal>x</p>"#;
        assert!(!is_office_content(libre));
    }
}
