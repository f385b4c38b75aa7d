use rand::{Rng, SeedableRng};
use rect_dissect_core::config::{DissectConfig, Strategy};
use rect_dissect_core::model::Rect;
use rect_dissect_core::verify::check_dissection;
use rect_dissect_core::dissect_with;

fn random_scene(rng: &mut rand::rngs::StdRng) -> (Rect, Vec<Rect>) {
    let sx = rng.gen_range(0..20) as f64;
    let sy = rng.gen_range(0..20) as f64;
    let sw = rng.gen_range(1..=64) as f64;
    let sh = rng.gen_range(1..=64) as f64;
    let source = Rect::new(sx, sy, sw, sh);
    let n = rng.gen_range(0..12);
    let holes = (0..n)
        .map(|_| {
            // Some holes poke out of the source; some are zero-area.
            let x = sx + rng.gen_range(-4..sw as i64) as f64;
            let y = sy + rng.gen_range(-4..sh as i64) as f64;
            let w = rng.gen_range(0..=20) as f64;
            let h = rng.gen_range(0..=20) as f64;
            Rect::new(x, y, w, h)
        })
        .collect();
    (source, holes)
}

fn disjoint(rects: &[Rect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].intersects(&rects[j]) {
                return false;
            }
        }
    }
    true
}

#[test]
fn random_scenes_are_valid_dissections() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let (source, holes) = random_scene(&mut rng);
        for strategy in [Strategy::GridMarker, Strategy::Bands] {
            for clip in [true, false] {
                let cfg = DissectConfig::builder()
                    .strategy(strategy)
                    .clip_holes(clip)
                    .build();
                let d = dissect_with(source, &holes, &cfg).unwrap();
                assert!(disjoint(&d));
                assert!(d.iter().all(|r| source.contains(r) && !r.is_empty()));
                if let Err(v) = check_dissection(&source, &holes, &d) {
                    panic!(
                        "{:?} clip={} source={:?} holes={:?}: {}",
                        strategy, clip, source, holes, v
                    );
                }
            }
        }
    }
}

#[test]
fn covered_area_matches_source_minus_holes() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (source, holes) = random_scene(&mut rng);
        let a = dissect_with(source, &holes, &DissectConfig::default()).unwrap();
        let b = dissect_with(
            source,
            &holes,
            &DissectConfig::builder().strategy(Strategy::Bands).build(),
        )
        .unwrap();
        let area_a: f64 = a.iter().map(Rect::area).sum();
        let area_b: f64 = b.iter().map(Rect::area).sum();
        assert_eq!(area_a, area_b);
    }
}

#[test]
fn dissection_is_repeatable() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
    for _ in 0..30 {
        let (source, holes) = random_scene(&mut rng);
        for strategy in [Strategy::GridMarker, Strategy::Bands] {
            let cfg = DissectConfig::builder().strategy(strategy).build();
            let d1 = dissect_with(source, &holes, &cfg).unwrap();
            let d2 = dissect_with(source, &holes, &cfg).unwrap();
            assert_eq!(d1, d2);
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_bands_match_sequential() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(99);
    for _ in 0..30 {
        let (source, holes) = random_scene(&mut rng);
        let seq = DissectConfig::builder().strategy(Strategy::Bands).build();
        let par = DissectConfig::builder()
            .strategy(Strategy::Bands)
            .parallel(true)
            .build();
        assert_eq!(
            dissect_with(source, &holes, &seq).unwrap(),
            dissect_with(source, &holes, &par).unwrap()
        );
    }
}
