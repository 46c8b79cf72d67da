use noesis::stamp::{SerialGenerator, Stamp, Tense};

fn inputs(n: usize) -> Vec<Stamp> {
    let mut serials = SerialGenerator::new();
    (0..n).map(|_| Stamp::input(serials.generate(), 0, None, 5)).collect()
}

#[test]
fn distinct_inputs_do_not_overlap() {
    let stamps = inputs(2);
    assert!(!stamps[0].overlaps(&stamps[1]));
    assert!(stamps[0].overlaps(&stamps[0]));
}

#[test]
fn merged_stamp_overlaps_both_parents() {
    let stamps = inputs(2);
    let merged = Stamp::merge(&stamps[0], &stamps[1], 1, 8).expect("independent premises");
    assert!(merged.overlaps(&stamps[0]));
    assert!(merged.overlaps(&stamps[1]));
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.creation_time(), 1);
}

#[test]
fn overlapping_merge_is_refused() {
    let stamps = inputs(2);
    let merged = Stamp::merge(&stamps[0], &stamps[1], 1, 8).expect("independent premises");
    assert!(Stamp::merge(&stamps[0], &merged, 2, 8).is_none());
    assert!(Stamp::merge(&merged, &merged, 2, 8).is_none());
}

#[test]
fn merge_interleaves_and_truncates() {
    let s = inputs(4);
    let odd = Stamp::merge(&s[0], &s[2], 1, 8).unwrap();
    let even = Stamp::merge(&s[1], &s[3], 1, 8).unwrap();
    assert_eq!(odd.base(), &[1, 3]);
    let all = Stamp::merge(&odd, &even, 2, 8).unwrap();
    assert_eq!(all.base(), &[1, 2, 3, 4]);
    let short = Stamp::merge(&odd, &even, 2, 3).unwrap();
    assert_eq!(short.base(), &[1, 2, 3]);
}

#[test]
fn equality_ignores_order_of_evidence() {
    let s = inputs(2);
    let ab = Stamp::merge(&s[0], &s[1], 1, 8).unwrap();
    let ba = Stamp::merge(&s[1], &s[0], 7, 8).unwrap();
    assert_ne!(ab.base(), ba.base());
    assert_eq!(ab, ba);
    assert_ne!(s[0], s[1]);
}

#[test]
fn tense_sets_occurrence() {
    let future = Stamp::input(1, 10, Some(Tense::Future), 5);
    assert_eq!(future.occurrence_time(), Some(15));
    let past = Stamp::input(2, 3, Some(Tense::Past), 5);
    assert_eq!(past.occurrence_time(), Some(0));
    let present = Stamp::input(3, 4, Some(Tense::Present), 5);
    assert_eq!(present.occurrence_time(), Some(4));
    assert!(Stamp::input(4, 4, None, 5).is_eternal());

    // same evidence at different moments is different evidence
    let now = Stamp::input(5, 4, Some(Tense::Present), 5);
    let eternal = Stamp::input(5, 4, None, 5);
    assert_ne!(now, eternal);
}

#[test]
fn tense_markers() {
    for tense in [Tense::Past, Tense::Present, Tense::Future] {
        assert_eq!(Tense::from_marker(tense.marker()), Some(tense));
    }
    assert_eq!(Tense::from_marker(":-:"), None);
}

#[test]
fn serials_are_fresh() {
    let mut serials = SerialGenerator::new();
    let a = serials.generate();
    let b = serials.generate();
    assert_ne!(a, b);
    assert_eq!(serials.current(), b);
}
