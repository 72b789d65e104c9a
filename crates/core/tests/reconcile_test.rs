//! Tests for positional and resource reconciliation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use wordpaste_core::PasteError;
use wordpaste_core::image::ImageType;
use wordpaste_core::reconcile::{
    BuiltinBase64Encoder, Diagnostic, HostProvidedEncoder, MemoryResolver, MismatchPolicy,
    Reconciler, ResourceResolver,
};

const PNG_HEAD: [u8; 4] = [0x89, 0x50, 0x4e, 0x47];
const PNG_URI: &str = "data:image/png;base64,iVBORw==";
const GIF_HEAD: &[u8] = b"GIF89a";
const GIF_URI: &str = "data:image/gif;base64,R0lGODlh";

fn reconciler() -> Reconciler {
    Reconciler::default()
}

fn with_resolver(resolver: impl ResourceResolver + 'static) -> Reconciler {
    Reconciler::new(Arc::new(BuiltinBase64Encoder), Arc::new(resolver))
}

// ============================================================================
// Positional mode
// ============================================================================

#[tokio::test]
async fn test_single_image_replaced() {
    let html = r#"<img src="file://img1.png">"#;
    let rtf = r"{\rtf1{\pict\pngblip 89504e47}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(out.html, format!(r#"<img src="{PNG_URI}">"#));
    assert!(out.is_clean());
}

#[tokio::test]
async fn test_other_markup_preserved() {
    let html = r#"<p class=MsoNormal>a<img width=20 height=20 src="file:///C:/Users/x/AppData/Local/Temp/msohtmlclip1/01/clip_image002.png" alt="Logo" v:shapes="Picture_x0020_1">b</p>"#;
    let rtf = r"{\rtf1{\*\shppict{\pict\pngblip\bliptag-5 89504e47}}{\nonshppict{\pict\wmetafile8\bliptag-5 0100}}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(
        out.html,
        format!(
            r#"<p class=MsoNormal>a<img width=20 height=20 src="{PNG_URI}" alt="Logo" v:shapes="Picture_x0020_1">b</p>"#
        )
    );
}

#[tokio::test]
async fn test_count_mismatch_returns_input() {
    let html = r#"<img src="file://a.png"><img src="file://b.png">"#;
    let rtf = r"{\rtf1{\pict\pngblip 89504e47}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(out.html, html);
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::CountMismatch {
            references: 2,
            records: 1
        }]
    );
}

#[tokio::test]
async fn test_count_mismatch_strict() {
    let html = r#"<img src="file://a.png"><img src="file://b.png">"#;
    let rtf = r"{\rtf1{\pict\pngblip 89504e47}}";
    let err = reconciler()
        .with_mismatch_policy(MismatchPolicy::Strict)
        .reconcile(html, Some(rtf))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PasteError::CountMismatch {
            references: 2,
            records: 1
        }
    ));
}

#[tokio::test]
async fn test_unsupported_image_left_unresolved() {
    let html = r#"<img src="file://a.emf"><img src="file://b.png">"#;
    let rtf = r"{\rtf1{\pict\emfblip 01000000}{\pict\pngblip 89504e47}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="file://a.emf"><img src="{PNG_URI}">"#)
    );
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::UnresolvedReference {
            index: 0,
            reference: "file://a.emf".to_string(),
            image_type: ImageType::Emf,
        }]
    );
}

#[tokio::test]
async fn test_only_file_references_rewritten() {
    let html = r#"<img src="https://example.com/a.png"><img src="file://b.gif">"#;
    let rtf = r"{\rtf1{\pict\pngblip 89504e47}{\pict\pngblip 474946383961}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(
        out.html,
        r#"<img src="https://example.com/a.png"><img src="data:image/png;base64,R0lGODlh">"#
    );
}

#[tokio::test]
async fn test_same_path_twice_rewrites_in_order() {
    let html = r#"<img src="file://same.png"><img src="file://same.png">"#;
    let rtf = r"{\rtf1{\pict\pngblip 89504e47}{\pict\pngblip 474946383961}}";
    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="{PNG_URI}"><img src="data:image/png;base64,R0lGODlh">"#)
    );
}

#[tokio::test]
async fn test_no_images_in_html() {
    let html = "<p>Hello</p>";
    let out = reconciler()
        .reconcile(html, Some(r"{\rtf1{\pict\pngblip 00}}"))
        .await
        .unwrap();
    assert_eq!(out.html, html);
    assert!(out.is_clean());
}

#[tokio::test]
async fn test_no_images_in_rtf() {
    let html = r#"<img src="file://a.png">"#;
    let out = reconciler()
        .reconcile(html, Some(r"{\rtf1\ansi Hello}"))
        .await
        .unwrap();
    assert_eq!(out.html, html);
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::CountMismatch {
            references: 1,
            records: 0
        }]
    );
}

#[tokio::test]
async fn test_only_fallback_images_in_rtf() {
    let html = r#"<img src="file://a.png">"#;
    let rtf = r"{\rtf1{\nonshppict{\pict\wmetafile8 0100}}}";

    let out = reconciler().reconcile(html, Some(rtf)).await.unwrap();
    assert_eq!(out.html, html);
    assert_eq!(
        out.diagnostics,
        vec![Diagnostic::CountMismatch {
            references: 1,
            records: 0
        }]
    );

    let err = reconciler()
        .with_mismatch_policy(MismatchPolicy::Strict)
        .reconcile(html, Some(rtf))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PasteError::CountMismatch {
            references: 1,
            records: 0
        }
    ));
}

#[tokio::test]
async fn test_count_mismatch_skips_encoder() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let encoder = HostProvidedEncoder::new(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
        async { Some("https://cdn.example/up".to_string()) }
    });
    let reconciler = Reconciler::new(Arc::new(encoder), Arc::new(MemoryResolver::new()));
    let html = r#"<img src="file://a.png"><img src="file://b.png">"#;
    let out = reconciler
        .reconcile(html, Some(r"{\rtf1{\pict\pngblip 89504e47}}"))
        .await
        .unwrap();
    assert_eq!(out.html, html);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_encoder_refusal_reported() {
    let encoder = HostProvidedEncoder::new(|_, _| async { None });
    let reconciler = Reconciler::new(Arc::new(encoder), Arc::new(MemoryResolver::new()));
    let html = r#"<img src="file://a.png">"#;
    let out = reconciler
        .reconcile(html, Some(r"{\rtf1{\pict\pngblip 89504e47}}"))
        .await
        .unwrap();
    assert_eq!(out.html, html);
    assert!(matches!(
        &out.diagnostics[..],
        [Diagnostic::EncodeFailed { index: 0, reference, .. }] if reference == "file://a.png"
    ));
}

#[tokio::test]
async fn test_host_encoder_in_positional_mode() {
    let encoder = HostProvidedEncoder::new(|bytes: Arc<[u8]>, image_type: ImageType| async move {
        Some(format!("https://cdn.example/{}-{}", image_type.mime()?.replace('/', "_"), bytes.len()))
    });
    let reconciler = Reconciler::new(Arc::new(encoder), Arc::new(MemoryResolver::new()));
    let html = r#"<img src="file://a.png">"#;
    let out = reconciler
        .reconcile(html, Some(r"{\rtf1{\pict\jpegblip ffd8ff}}"))
        .await
        .unwrap();
    assert_eq!(out.html, r#"<img src="https://cdn.example/image_jpeg-3">"#);
}

// ============================================================================
// Resource mode
// ============================================================================

#[tokio::test]
async fn test_resources_replaced_everywhere() {
    let resolver = MemoryResolver::new().with("blob:https://host/1", PNG_HEAD.to_vec());
    let html = r#"<img src="blob:https://host/1"><a href="blob:https://host/1">x</a><img src="blob:https://host/1">"#;
    let out = with_resolver(resolver).reconcile(html, None).await.unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="{PNG_URI}"><a href="{PNG_URI}">x</a><img src="{PNG_URI}">"#)
    );
    assert!(out.is_clean());
}

#[tokio::test]
async fn test_empty_rtf_uses_resource_mode() {
    let resolver = MemoryResolver::new().with("blob:g", GIF_HEAD.to_vec());
    let out = with_resolver(resolver)
        .reconcile(r#"<img src="blob:g">"#, Some(""))
        .await
        .unwrap();
    assert_eq!(out.html, format!(r#"<img src="{GIF_URI}">"#));
}

#[tokio::test]
async fn test_failed_resource_is_isolated() {
    let resolver = MemoryResolver::new()
        .with("blob:ok", GIF_HEAD.to_vec())
        .with("blob:text", b"plain text".to_vec());
    let html = r#"<img src="blob:missing"><img src="blob:ok"><img src="blob:text">"#;
    let out = with_resolver(resolver).reconcile(html, None).await.unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="blob:missing"><img src="{GIF_URI}"><img src="blob:text">"#)
    );
    let failed: Vec<&str> = out
        .diagnostics
        .iter()
        .map(|d| match d {
            Diagnostic::ResolveFailed { reference, .. } => reference.as_str(),
            other => panic!("unexpected diagnostic {other:?}"),
        })
        .collect();
    assert_eq!(failed, vec!["blob:missing", "blob:text"]);
}

#[tokio::test]
async fn test_prefix_references_replaced_independently() {
    let resolver = MemoryResolver::new()
        .with("blob:x/1", PNG_HEAD.to_vec())
        .with("blob:x/10", GIF_HEAD.to_vec());
    let html = r#"<img src="blob:x/1"><img src="blob:x/10"><img src="blob:x/1">"#;
    let out = with_resolver(resolver).reconcile(html, None).await.unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="{PNG_URI}"><img src="{GIF_URI}"><img src="{PNG_URI}">"#)
    );
    assert!(out.is_clean());
}

#[tokio::test]
async fn test_failed_prefix_reference_leaves_longer_one_intact() {
    let resolver = MemoryResolver::new().with("blob:x/1", PNG_HEAD.to_vec());
    let html = r#"<img src="blob:x/10"><img src="blob:x/1">"#;
    let out = with_resolver(resolver).reconcile(html, None).await.unwrap();
    // blob:x/10 is unresolved; the shorter match must not split it.
    assert_eq!(
        out.html,
        format!(r#"<img src="blob:x/10"><img src="{PNG_URI}">"#)
    );
    assert_eq!(out.diagnostics.len(), 1);
}

struct CountingResolver {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ResourceResolver for CountingResolver {
    async fn resolve(&self, _reference: &str) -> wordpaste_core::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PNG_HEAD.to_vec())
    }
}

#[tokio::test]
async fn test_each_resource_resolved_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let resolver = CountingResolver {
        calls: calls.clone(),
    };
    let html = r#"<img src="blob:a"><img src="blob:b"><img src="blob:a"><img src="BLOB:c">"#;
    let out = with_resolver(resolver).reconcile(html, None).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(!out.html.contains("blob:"));
    assert!(!out.html.contains("BLOB:"));
}

struct DelayedResolver;

#[async_trait]
impl ResourceResolver for DelayedResolver {
    async fn resolve(&self, reference: &str) -> wordpaste_core::Result<Vec<u8>> {
        let delay = match reference {
            "blob:slow" => Duration::from_millis(40),
            "blob:stuck" => Duration::from_secs(30),
            _ => Duration::ZERO,
        };
        tokio::time::sleep(delay).await;
        if reference == "blob:fast" {
            Ok(GIF_HEAD.to_vec())
        } else {
            Ok(PNG_HEAD.to_vec())
        }
    }
}

#[tokio::test]
async fn test_results_applied_by_reference_not_completion() {
    let html = r#"<img src="blob:slow"><img src="blob:fast">"#;
    let out = with_resolver(DelayedResolver)
        .reconcile(html, None)
        .await
        .unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="{PNG_URI}"><img src="{GIF_URI}">"#)
    );
}

#[tokio::test]
async fn test_timeout_only_affects_its_reference() {
    let html = r#"<img src="blob:stuck"><img src="blob:fast">"#;
    let out = with_resolver(DelayedResolver)
        .with_timeout(Duration::from_millis(100))
        .reconcile(html, None)
        .await
        .unwrap();
    assert_eq!(
        out.html,
        format!(r#"<img src="blob:stuck"><img src="{GIF_URI}">"#)
    );
    assert!(matches!(
        &out.diagnostics[..],
        [Diagnostic::ResolveFailed { reference, reason }]
            if reference == "blob:stuck" && reason.contains("timed out")
    ));
}

#[tokio::test]
async fn test_no_resolver_reports_failure() {
    let html = r#"<img src="blob:a">"#;
    let out = reconciler().reconcile(html, None).await.unwrap();
    assert_eq!(out.html, html);
    assert_eq!(out.diagnostics.len(), 1);
}

#[tokio::test]
async fn test_local_files_without_rtf_untouched() {
    let html = r#"<img src="file://a.png">"#;
    let out = reconciler().reconcile(html, None).await.unwrap();
    assert_eq!(out.html, html);
    assert!(out.is_clean());
}

#[tokio::test]
async fn test_diagnostics_serialize_as_json() {
    let html = r#"<img src="file://a.wmf">"#;
    let out = reconciler()
        .reconcile(html, Some(r"{\rtf1{\pict\wmetafile8 0100}}"))
        .await
        .unwrap();
    let json = serde_json::to_value(&out.diagnostics).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "kind": "unresolved_reference",
            "index": 0,
            "reference": "file://a.wmf",
            "image_type": "wmf",
        }])
    );
}
