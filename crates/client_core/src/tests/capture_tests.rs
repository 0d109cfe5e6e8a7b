use super::*;

fn file(name: &str, mime: Option<&str>) -> ImageFile {
    ImageFile::new(name, mime.map(str::to_string), b"pixels".to_vec())
}

#[test]
fn appends_in_order_with_distinct_handles() {
    let mut capture = ImageCapture::new();
    let added = capture.add_files(
        CaptureSource::Picker,
        [
            file("burger.jpg", Some("image/jpeg")),
            file("fries.png", Some("image/png")),
        ],
    );
    assert_eq!(added, 2);
    assert_eq!(capture.images()[0].file.filename, "burger.jpg");
    assert_eq!(capture.images()[1].file.filename, "fries.png");
    assert_ne!(capture.images()[0].preview, capture.images()[1].preview);
}

#[test]
fn both_sources_apply_the_same_image_filter() {
    for source in [CaptureSource::Picker, CaptureSource::DragDrop] {
        let mut capture = ImageCapture::new();
        let added = capture.add_files(
            source,
            [
                file("menu.pdf", Some("application/pdf")),
                file("notes.txt", None),
                file("pizza.webp", Some("image/webp")),
            ],
        );
        assert_eq!(added, 1, "{source:?}");
        assert_eq!(capture.images()[0].file.filename, "pizza.webp");
    }
}

#[test]
fn guesses_type_from_name_when_declared_type_is_generic() {
    let sushi = file("sushi.PNG", Some("application/octet-stream"));
    assert_eq!(sushi.effective_mime_type(), "image/png");
    assert!(sushi.is_image());

    let unknown = file("blob", None);
    assert!(!unknown.is_image());
}

#[test]
fn empty_files_are_skipped() {
    let mut capture = ImageCapture::new();
    let added = capture.add_files(
        CaptureSource::DragDrop,
        [ImageFile::new("empty.png", Some("image/png".into()), Vec::new())],
    );
    assert_eq!(added, 0);
    assert!(capture.is_empty());
}

#[test]
fn removal_releases_preview_and_keeps_order() {
    let mut capture = ImageCapture::new();
    capture.add_files(
        CaptureSource::Picker,
        [
            file("a.png", None),
            file("b.png", None),
            file("c.png", None),
        ],
    );
    let removed = capture.remove(1).expect("removed");
    assert_eq!(removed.file.filename, "b.png");
    assert!(capture.preview(removed.preview).is_none());

    let names: Vec<&str> = capture
        .images()
        .iter()
        .map(|image| image.file.filename.as_str())
        .collect();
    assert_eq!(names, ["a.png", "c.png"]);
    assert!(capture.remove(5).is_none());
}

#[test]
fn handles_are_not_reused_after_release() {
    let mut capture = ImageCapture::new();
    capture.add_files(CaptureSource::Picker, [file("a.png", None)]);
    let first = capture.images()[0].preview;
    assert_eq!(capture.clear(), 1);

    capture.add_files(CaptureSource::Picker, [file("b.png", None)]);
    let second = capture.images()[0].preview;
    assert_ne!(first, second);
    assert!(capture.preview(first).is_none());
    assert_eq!(capture.preview(second).expect("live").filename, "b.png");
}

#[test]
fn source_images_use_effective_type() {
    let mut capture = ImageCapture::new();
    capture.add_files(CaptureSource::Picker, [file("taco.jpeg", None)]);
    let sources = capture.source_images();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].mime_type, "image/jpeg");
    assert_eq!(sources[0].bytes, b"pixels");
}

#[test]
fn parses_capture_source_names() {
    assert_eq!(CaptureSource::parse("drop"), Some(CaptureSource::DragDrop));
    assert_eq!(CaptureSource::parse("Picker"), Some(CaptureSource::Picker));
    assert_eq!(CaptureSource::parse("camera"), None);
}

#[test]
fn remove_and_clear_leave_no_live_previews() {
    let mut capture = ImageCapture::new();
    capture.add_files(
        CaptureSource::DragDrop,
        [
            file("ceviche.jpg", Some("image/jpeg")),
            file("lomo.png", Some("image/png")),
            file("causa.png", Some("image/png")),
        ],
    );
    assert_eq!(capture.live_previews(), 3);

    let removed = capture.remove(1).expect("staged");
    assert_eq!(capture.live_previews(), 2);
    assert!(capture.preview(removed.preview).is_none());

    let handles: Vec<PreviewHandle> = capture.images().iter().map(|i| i.preview).collect();
    assert_eq!(capture.clear(), 2);
    assert_eq!(capture.live_previews(), 0);
    assert!(handles.iter().all(|h| capture.preview(*h).is_none()));
}

#[test]
fn files_snapshot_keeps_order_and_is_detached() {
    let mut capture = ImageCapture::new();
    capture.add_files(
        CaptureSource::Picker,
        [
            file("burger.jpg", Some("image/jpeg")),
            file("fries.png", Some("image/png")),
        ],
    );

    let snapshot = capture.files();
    capture.clear();

    let names: Vec<&str> = snapshot.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(names, ["burger.jpg", "fries.png"]);
    assert_eq!(snapshot[0].bytes, b"pixels");
}
