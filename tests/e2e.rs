//! End-to-end tests for cvpress.
//!
//! These drive the public API from surfaces to PDF bytes and parse the result
//! back with `lopdf` to count pages and check which image each page draws.
//! Everything runs in-process; no files are written outside a temp dir.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use cvpress::{
    default_filename, generate, generate_to_dir, plan, render_previews, AssemblyConfig,
    AssemblyProgressCallback, BitmapSurface, CvPressError, CvRecord, DocumentKind,
    StatusObserver, StatusSignal, SurfaceHandle, SurfaceRegistry, Theme,
};
use image::{Rgba, RgbaImage};
use lopdf::Document;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Records every status transition.
#[derive(Default)]
struct Transitions(Mutex<Vec<bool>>);

impl StatusObserver for Transitions {
    fn on_status_change(&self, generating: bool) {
        self.0.lock().unwrap().push(generating);
    }
}

impl Transitions {
    fn seen(&self) -> Vec<bool> {
        self.0.lock().unwrap().clone()
    }
}

fn tracked_status() -> (StatusSignal, Arc<Transitions>) {
    let transitions = Arc::new(Transitions::default());
    let status = StatusSignal::new().with_observer(transitions.clone());
    (status, transitions)
}

#[derive(Default)]
struct Events {
    captured: AtomicUsize,
    paginated: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl AssemblyProgressCallback for Events {
    fn on_source_captured(&self, _handle: &str, _width: u32, _height: u32) {
        self.captured.fetch_add(1, Ordering::SeqCst);
    }

    fn on_source_paginated(&self, _handle: &str, _page_count: usize) {
        self.paginated.fetch_add(1, Ordering::SeqCst);
    }

    fn on_generation_complete(&self, _total_pages: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_generation_failed(&self, _error: &str) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

fn bitmap(width: u32, height: u32) -> Arc<BitmapSurface> {
    Arc::new(BitmapSurface::new(RgbaImage::from_pixel(
        width,
        height,
        Rgba([40, 40, 40, 255]),
    )))
}

fn surfaces(cv: Option<(u32, u32)>, letter: Option<(u32, u32)>) -> SurfaceRegistry {
    let mut registry = SurfaceRegistry::new();
    if let Some((w, h)) = cv {
        registry.insert(SurfaceHandle::CV, bitmap(w, h));
    }
    if let Some((w, h)) = letter {
        registry.insert(SurfaceHandle::COVER_LETTER, bitmap(w, h));
    }
    registry
}

/// Snapshots at 1× so pixel sizes map straight to millimetres.
fn config_1x() -> AssemblyConfig {
    AssemblyConfig::builder().capture_scale(1).build().unwrap()
}

/// XObject name drawn on each page, in page order.
fn drawn_images(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("valid PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let names: Vec<String> = xobjects
                .iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect();
            assert_eq!(names.len(), 1, "each page draws exactly one image");
            names[0].clone()
        })
        .collect()
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).expect("valid PDF").get_pages().len()
}

// ── Pagination through the full pipeline ─────────────────────────────────────

#[tokio::test]
async fn test_short_cv_is_one_page() {
    // 1000x500 px → 105 mm.
    let provider = surfaces(Some((1000, 500)), None);
    let artifact = generate(
        DocumentKind::Cv,
        "cv.pdf",
        &provider,
        &config_1x(),
        &StatusSignal::new(),
    )
    .await
    .unwrap();
    assert_eq!(artifact.page_count(), 1);
    assert_eq!(page_count(&artifact.bytes), 1);
}

#[tokio::test]
async fn test_exact_multiple_is_not_padded() {
    // 420x1188 px → 594 mm = 2 × 297.
    let provider = surfaces(Some((420, 1188)), None);
    let artifact = generate(
        DocumentKind::Cv,
        "cv.pdf",
        &provider,
        &config_1x(),
        &StatusSignal::new(),
    )
    .await
    .unwrap();
    assert_eq!(page_count(&artifact.bytes), 2);
}

#[tokio::test]
async fn test_partial_remainder_gets_a_page() {
    // 420x1288 px → 644 mm = 2 × 297 + 50.
    let provider = surfaces(None, Some((420, 1288)));
    let artifact = generate(
        DocumentKind::CoverLetter,
        "letter.pdf",
        &provider,
        &config_1x(),
        &StatusSignal::new(),
    )
    .await
    .unwrap();
    assert_eq!(page_count(&artifact.bytes), 3);
    assert_eq!(artifact.stats.sources.len(), 1);
    assert_eq!(artifact.stats.sources[0].handle.as_str(), "cover-letter-preview");
}

#[tokio::test]
async fn test_combined_document_orders_cv_first() {
    let provider = surfaces(Some((420, 1188)), Some((420, 300)));
    let artifact = generate(
        DocumentKind::Both,
        "both.pdf",
        &provider,
        &config_1x(),
        &StatusSignal::new(),
    )
    .await
    .unwrap();

    assert_eq!(artifact.page_count(), 3);
    assert_eq!(drawn_images(&artifact.bytes), ["Im0", "Im0", "Im1"]);
    let per_source: Vec<usize> = artifact.stats.sources.iter().map(|s| s.page_count).collect();
    assert_eq!(per_source, [2, 1]);
}

#[tokio::test]
async fn test_scale_does_not_change_page_count() {
    let provider = surfaces(Some((420, 1288)), None);
    let at_1x = plan(DocumentKind::Cv, &provider, &config_1x()).unwrap();
    let at_2x = plan(DocumentKind::Cv, &provider, &AssemblyConfig::default()).unwrap();
    assert_eq!(at_1x.page_count(), 3);
    assert_eq!(at_2x.page_count(), 3);
    assert_eq!(at_2x.sources[0].width_px, 840);
}

// ── Failure atomicity and status cleanup ─────────────────────────────────────

#[tokio::test]
async fn test_missing_cover_letter_delivers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let provider = surfaces(Some((420, 1188)), None);
    let events = Arc::new(Events::default());
    let config = AssemblyConfig::builder()
        .capture_scale(1)
        .progress_callback(events.clone())
        .build()
        .unwrap();
    let (status, transitions) = tracked_status();

    let err = generate_to_dir(
        DocumentKind::Both,
        "Ada_Documents.pdf",
        dir.path(),
        &provider,
        &config,
        &status,
    )
    .await
    .unwrap_err();

    assert!(
        matches!(&err, CvPressError::SurfaceNotFound { handle } if handle == "cover-letter-preview")
    );
    assert_eq!(err.user_message(), "Download failed. Please try again.");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0, "no file, not even a temp file");
    assert_eq!(transitions.seen(), [true, false]);
    assert!(!status.is_generating());

    assert_eq!(events.captured.load(Ordering::SeqCst), 1, "CV was captured first");
    assert_eq!(events.failed.load(Ordering::SeqCst), 1);
    assert_eq!(events.completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_clears_on_every_outcome() {
    let outcomes: [(SurfaceRegistry, bool); 3] = [
        (surfaces(Some((420, 600)), None), true),
        (surfaces(None, None), false),
        (surfaces(Some((0, 600)), None), false),
    ];

    for (provider, should_succeed) in outcomes {
        let (status, transitions) = tracked_status();
        let mut rx = status.subscribe();
        let result = generate(DocumentKind::Cv, "cv.pdf", &provider, &config_1x(), &status).await;

        assert_eq!(result.is_ok(), should_succeed);
        assert_eq!(transitions.seen(), [true, false]);
        assert!(!*rx.borrow_and_update());
    }
}

#[tokio::test]
async fn test_zero_width_capture_is_invalid_geometry() {
    let dir = tempfile::tempdir().unwrap();
    let provider = surfaces(Some((0, 600)), None);
    let err = generate_to_dir(
        DocumentKind::Cv,
        "cv.pdf",
        dir.path(),
        &provider,
        &config_1x(),
        &StatusSignal::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CvPressError::InvalidGeometry { width: 0, height: 600 }));
    assert!(err.is_contract_violation());
    assert!(!dir.path().join("cv.pdf").exists());
}

#[tokio::test]
async fn test_filename_with_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let provider = surfaces(Some((100, 100)), None);
    let (status, transitions) = tracked_status();
    let err = generate_to_dir(
        DocumentKind::Cv,
        "../escape.pdf",
        dir.path(),
        &provider,
        &config_1x(),
        &status,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CvPressError::InvalidConfig(_)));
    assert_eq!(transitions.seen(), [true, false]);
}

// ── Built-in previews ────────────────────────────────────────────────────────

const RECORD_JSON: &str = r#"{
  "personalInfo": {
    "fullName": "Ada Obi",
    "email": "ada@example.com",
    "phone": "+234 800 000 0000",
    "address": "Lagos"
  },
  "careerObjective": "Backend engineer focused on dependable payment systems.",
  "workExperience": [
    {
      "id": "1",
      "jobTitle": "Backend Engineer",
      "company": "Paystack",
      "location": "Lagos",
      "startDate": "2021-01",
      "endDate": "",
      "isCurrentJob": true,
      "responsibilities": ["Built the settlement service", "Cut p99 latency by 40%"]
    }
  ],
  "education": [
    {
      "id": "2",
      "degree": "B.Sc. Computer Science",
      "institution": "University of Lagos",
      "location": "Lagos",
      "graduationYear": "2019",
      "courseType": "university"
    }
  ],
  "skills": ["Rust", "PostgreSQL", "Kafka"],
  "certifications": [],
  "jobType": "Software Engineering",
  "nysc": { "completed": true, "year": "2020", "state": "Oyo" }
}"#;

#[tokio::test]
async fn test_record_to_pdf_on_disk() {
    let record = CvRecord::from_json_str(RECORD_JSON).unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let previews = render_previews(&record, Theme::Modern, date);

    let kind = DocumentKind::Both;
    let filename = default_filename(kind, &record.personal_info.full_name);
    assert_eq!(filename, "Ada Obi_Documents.pdf");

    let config = AssemblyConfig::builder()
        .author(record.personal_info.full_name.clone())
        .build()
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let (path, stats) = generate_to_dir(
        kind,
        &filename,
        dir.path(),
        &previews,
        &config,
        &StatusSignal::new(),
    )
    .await
    .unwrap();

    assert_eq!(path, dir.path().join("Ada Obi_Documents.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(page_count(&bytes), stats.total_pages);
    assert!(stats.total_pages >= 2, "CV and letter never share a page");
    assert_eq!(stats.sources[0].width_px, 794 * 2);

    let drawn = drawn_images(&bytes);
    assert_eq!(drawn.last().map(String::as_str), Some("Im1"));
    assert_eq!(drawn.first().map(String::as_str), Some("Im0"));
}

#[tokio::test]
async fn test_plan_matches_generation_for_builtin_previews() {
    let record = CvRecord::from_json_str(RECORD_JSON).unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let previews = render_previews(&record, Theme::Classic, date);
    let config = AssemblyConfig::default();

    let dry = plan(DocumentKind::Both, &previews, &config).unwrap();
    let artifact = generate(DocumentKind::Both, "x.pdf", &previews, &config, &StatusSignal::new())
        .await
        .unwrap();
    assert_eq!(dry.page_count(), artifact.page_count());
    assert_eq!(
        dry.sources.iter().map(|s| s.page_count).collect::<Vec<_>>(),
        artifact.stats.sources.iter().map(|s| s.page_count).collect::<Vec<_>>()
    );
}
