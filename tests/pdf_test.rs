//! Integration tests for PDF pages.

mod common;

use common::*;
use unmark::engine::{DiagnosticTrace, Engine, EngineConfig, MatchRule};
use unmark::model::ContainerKind;
use unmark::processor::{PdfProcessor, WatermarkProcessor};
use unmark::parser::Package;
use unmark::ErrorKind;

/// Bottom-right badge: 40 x 12 pt at (560, 20) on a Letter page.
const BADGE: (i64, i64, i64, i64) = (560, 20, 40, 12);
const BADGE_LINK: [i64; 4] = [555, 15, 605, 37];

fn badge(builder: PdfBuilder, name: &str) -> PdfBuilder {
    let (x, y, w, h) = BADGE;
    builder.image(name, x, y, w, h)
}

fn detect(pdf: &[u8]) -> unmark::DetectionReport {
    PdfProcessor::new()
        .detect_bytes(pdf, &Engine::default(), &mut DiagnosticTrace::disabled())
        .unwrap()
}

fn clean(pdf: &[u8]) -> unmark::CleanOutput {
    PdfProcessor::new()
        .remove_bytes(pdf, &Engine::default(), &mut DiagnosticTrace::disabled())
        .unwrap()
}

#[test]
fn test_linked_badge_removed_with_its_link() {
    let pdf = badge(PdfBuilder::new().page().text("Quarterly results"), "Im0")
        .image("Im1", 250, 400, 100, 100)
        .uri_link(BADGE_LINK, GAMMA_URL)
        .uri_link([72, 690, 200, 710], OTHER_URL)
        .build();

    let report = detect(&pdf);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.watermark_count(), 1);
    let hit = report.watermarks().next().unwrap();
    assert_eq!(hit.container.kind, ContainerKind::Page);
    assert_eq!(hit.container.name, "Page1");
    assert_eq!(hit.element_name, "Im0");
    assert_eq!(hit.link.as_deref(), Some(GAMMA_URL));
    assert_eq!(hit.rule, Some(MatchRule::LinkMatch));

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.pages_cleaned, 1);
    assert_eq!(out.report.links_removed, 1);

    let ops = &page_operators(&out.bytes)[0];
    assert!(!ops.contains(&"Do /Im0".to_string()));
    assert!(ops.contains(&"Do /Im1".to_string()));
    assert!(ops.contains(&"Tj".to_string()));
    assert_eq!(page_annotation_counts(&out.bytes), vec![1]);
}

#[test]
fn test_unlinked_badge_caught_by_size() {
    let pdf = badge(PdfBuilder::new().page(), "Im0").build();

    let report = detect(&pdf);
    assert_eq!(report.results[0].rule, Some(MatchRule::SizeHeuristic));

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.links_removed, 0);
    assert_eq!(page_operators(&out.bytes)[0], vec!["q", "cm", "Q"]);
}

#[test]
fn test_size_rule_disabled_keeps_badge() {
    let pdf = badge(PdfBuilder::new().page(), "Im0").build();
    let engine = Engine::new(EngineConfig::new().with_size_heuristic(false)).unwrap();

    let out = PdfProcessor::new()
        .remove_bytes(&pdf, &engine, &mut DiagnosticTrace::disabled())
        .unwrap();
    assert_eq!(out.report.watermarks_removed, 0);
}

#[test]
fn test_large_corner_image_is_kept() {
    // Starts in the corner but is far bigger than a logo.
    let pdf = PdfBuilder::new().page().image("Im0", 560, 0, 300, 70).build();
    assert!(!detect(&pdf).has_watermarks());
}

#[test]
fn test_foreign_link_vetoes_size_rule() {
    let pdf = badge(PdfBuilder::new().page(), "Im0")
        .uri_link(BADGE_LINK, OTHER_URL)
        .build();

    let report = detect(&pdf);
    assert_eq!(report.results[0].link.as_deref(), Some(OTHER_URL));
    assert!(!report.has_watermarks());
}

#[test]
fn test_internal_link_is_no_link() {
    let pdf = badge(PdfBuilder::new().page(), "Im0")
        .dest_link(BADGE_LINK)
        .build();

    let report = detect(&pdf);
    assert_eq!(report.results[0].link, None);

    // The badge goes; the in-document jump over it stays.
    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.links_removed, 0);
    assert_eq!(page_annotation_counts(&out.bytes), vec![1]);
}

#[test]
fn test_badge_link_found_behind_footer_link() {
    let pdf = badge(PdfBuilder::new().page(), "Im0")
        .uri_link([0, 0, 612, 60], OTHER_URL)
        .uri_link(BADGE_LINK, GAMMA_URL)
        .build();

    let report = detect(&pdf);
    assert_eq!(report.results[0].link.as_deref(), Some(GAMMA_URL));
    assert_eq!(report.watermark_count(), 1);

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.links_removed, 1);
    assert_eq!(page_annotation_counts(&out.bytes), vec![1]);
}

#[test]
fn test_only_target_links_leave_with_badge() {
    let pdf = badge(PdfBuilder::new().page(), "Im0")
        .uri_link(BADGE_LINK, GAMMA_URL)
        .dest_link([0, 0, 612, 60])
        .uri_link([500, 0, 612, 100], OTHER_URL)
        .build();

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.links_removed, 1);
    assert_eq!(page_annotation_counts(&out.bytes), vec![2]);
}

#[test]
fn test_centred_linked_image_is_kept() {
    let pdf = PdfBuilder::new()
        .page()
        .image("Im0", 250, 400, 40, 12)
        .uri_link([245, 395, 295, 417], GAMMA_URL)
        .build();

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 0);
    assert_eq!(page_annotation_counts(&out.bytes), vec![1]);
}

#[test]
fn test_pages_are_independent() {
    let pdf = badge(PdfBuilder::new().page().text("Cover").page().text("Body"), "Im0")
        .uri_link(BADGE_LINK, "https://SHARE.GAMMA.APP/x")
        .page()
        .build();

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    assert_eq!(out.report.pages_cleaned, 1);
    assert_eq!(out.report.containers[0].container.name, "Page2");

    let ops = page_operators(&out.bytes);
    assert_eq!(ops.len(), 3);
    assert_eq!(ops[0], page_operators(&pdf)[0]);
    assert!(!ops[1].iter().any(|op| op.starts_with("Do")));
}

#[test]
fn test_shared_image_stays_for_other_placement() {
    let pdf = badge(PdfBuilder::new().page(), "Im0")
        .image("Im0", 250, 400, 100, 100)
        .uri_link(BADGE_LINK, GAMMA_URL)
        .build();

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 1);
    let ops = &page_operators(&out.bytes)[0];
    assert_eq!(ops.iter().filter(|op| *op == "Do /Im0").count(), 1);
}

#[test]
fn test_form_contents_are_traced_not_removed() {
    let pdf = PdfBuilder::new()
        .page()
        .form("Fm0", 560, 20, &[("ImIn", 0, 0, 40, 12)])
        .build();

    let mut trace = DiagnosticTrace::new();
    let report = PdfProcessor::new()
        .detect_bytes(&pdf, &Engine::default(), &mut trace)
        .unwrap();
    assert!(report.results.is_empty());
    assert!(trace
        .events()
        .iter()
        .any(|e| e.element.as_deref() == Some("ImIn")
            && e.message.contains("not removal-eligible")));

    let out = clean(&pdf);
    assert_eq!(out.report.watermarks_removed, 0);
}

#[test]
fn test_second_pass_removes_nothing() {
    let pdf = badge(PdfBuilder::new().page().text("Hello"), "Im0")
        .uri_link(BADGE_LINK, GAMMA_URL)
        .build();

    let first = clean(&pdf);
    assert_eq!(first.report.watermarks_removed, 1);

    let second = clean(&first.bytes);
    assert_eq!(second.report.watermarks_removed, 0);
    assert_eq!(page_operators(&second.bytes), page_operators(&first.bytes));
}

#[test]
fn test_repeated_serialize_is_stable() {
    let pdf = badge(PdfBuilder::new().page(), "Im0").build();
    let engine = Engine::default();

    let mut package = PdfProcessor::new().load(&pdf, &engine).unwrap();
    engine.clean(package.document_mut(), &mut DiagnosticTrace::disabled());
    let first = package.serialize().unwrap();
    let second = package.serialize().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_pdf() {
    let err = PdfProcessor::new()
        .detect_bytes(
            b"%PDF-1.7\nthis is not a pdf",
            &Engine::default(),
            &mut DiagnosticTrace::disabled(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let err = PdfProcessor::new()
        .detect_bytes(b"%PDF-9.9\n", &Engine::default(), &mut DiagnosticTrace::disabled())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
