use huginn_minutiae::{
    CandidateRecord, DetectionResult, Frame, Gallery, HuginnMinutiaeError, Minutia, MinutiaKind,
};

const GALLERY: &str = "
; enrolled fingers
[candidate]
label = alice
sig   = frame=0,0,64,64|10:12:0.5:E;30:31:-1.5:B

[candidate]
label = bob
sig   = frame=2,2,60,60|20:22:2.25:B

; extra metadata sections are ignored
[metadata]
source = enrollment station 3
";

fn parse(input: &str) -> Gallery {
    match input.parse::<Gallery>() {
        Ok(g) => g,
        Err(e) => panic!("Failed to parse gallery: {e}"),
    }
}

#[test]
fn test_parses_candidates_in_order() {
    let gallery = parse(GALLERY);

    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery.candidates[0].id, "alice");
    assert_eq!(gallery.candidates[1].id, "bob");
    assert_eq!(gallery.candidates[0].features.len(), 2);
    assert_eq!(
        gallery.candidates[1].features.minutiae,
        vec![Minutia::new(20, 22, 2.25, MinutiaKind::Bifurcation)]
    );
    assert!(gallery.find("bob").is_some());
    assert!(gallery.find("carol").is_none());
}

#[test]
fn test_display_parses_back() {
    let mut gallery = Gallery::default();
    gallery.enroll(CandidateRecord::new(
        "left-index",
        DetectionResult::new(
            Frame::new(1, 2, 99, 98),
            vec![Minutia::new(5, 6, 0.1 + 0.2, MinutiaKind::RidgeEnding)],
        ),
    ));
    gallery.enroll(CandidateRecord::new("empty", DetectionResult::default()));

    assert_eq!(parse(&gallery.to_string()), gallery);
}

#[test]
fn test_empty_gallery() {
    assert!(parse("; nothing enrolled yet\n").is_empty());
}

#[test]
fn test_rejects_incomplete_records() {
    let cases = [
        "[candidate]\nlabel = alice\n",
        "[candidate]\nlabel = alice\nlabel = bob\nsig = frame=0,0,1,1|\n",
        "[candidate]\nsig = frame=0,0,1,1|\n",
        "label = alice\n",
        "[candidate]\nlabel = alice\n[candidate]\nlabel = bob\nsig = frame=0,0,1,1|\n",
        "[candidate]\nlabel = alice\nsig = frame=0,0,1,1|1:1\n",
    ];

    for input in cases {
        assert!(
            matches!(input.parse::<Gallery>(), Err(HuginnMinutiaeError::Parse(_))),
            "accepted {input:?}"
        );
    }
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("huginn-gallery-{}.db", std::process::id()));
    if let Err(e) = std::fs::write(&path, GALLERY) {
        panic!("Failed to write gallery: {e}");
    }

    let loaded = Gallery::load(&path);
    let _ = std::fs::remove_file(&path);

    match loaded {
        Ok(gallery) => assert_eq!(gallery, parse(GALLERY)),
        Err(e) => panic!("Failed to load gallery: {e}"),
    }
}

#[test]
fn test_load_missing_file() {
    let result = Gallery::load("/nonexistent/gallery.db");
    assert!(matches!(result, Err(HuginnMinutiaeError::Parse(_))));
}
