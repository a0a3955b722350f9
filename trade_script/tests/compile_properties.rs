use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trade_data::{CatalogueDef, SectionDef, TradeDef};
use trade_script::{
    CompileOptions, EmptySectionPolicy, allocate_ranges, compile_catalogue, offer_key_json, offer_value_json,
};

fn random_catalogue(seed: u64) -> CatalogueDef {
    let mut rng = StdRng::seed_from_u64(seed);
    let sections = (0..rng.random_range(1..8))
        .map(|s| {
            let mut section = SectionDef::new(format!("Section{s}"), rng.random_range(0..4));
            for t in 0..rng.random_range(0..12) {
                section.trades.push(TradeDef::new(
                    format!("minecraft:item_{s}_{t}"),
                    rng.random_range(1..65),
                    "minecraft:emerald",
                    rng.random_range(1..4),
                    f64::from(rng.random_range(0..20u32)) / 20.0,
                    rng.random_range(1..17),
                ));
            }
            section
        })
        .collect();
    CatalogueDef { sections }
}

/// Pull the drawn range bounds out of a sample command.
fn sample_bounds(line: &str) -> (usize, usize) {
    let (_, range) = line.rsplit_once(" random value ").expect("sample command");
    let (start, end) = range.split_once("..").expect("range");
    (start.parse().expect("start"), end.parse().expect("end"))
}

/// Pull the guard index out of a trade command.
fn guard_index(line: &str) -> usize {
    let rest = line.split(" matches ").nth(1).expect("matches clause");
    rest.split(' ').next().expect("index").parse().expect("numeric index")
}

fn legacy() -> CompileOptions {
    CompileOptions {
        empty_sections: EmptySectionPolicy::Legacy,
        ..CompileOptions::default()
    }
}

#[test]
fn ranges_partition_the_index_space() {
    for seed in 0..200 {
        let catalogue = random_catalogue(seed);
        let ranges = allocate_ranges(&catalogue);
        assert_eq!(ranges.len(), catalogue.sections.len());

        let mut expected_start = 1;
        for range in &ranges {
            assert_eq!(range.start, expected_start, "seed {seed}: gap or overlap before '{}'", range.section);
            expected_start = range.end() + 1;
        }
        assert_eq!(expected_start - 1, catalogue.trade_count(), "seed {seed}");

        let covered: usize = ranges.iter().map(|r| r.count).sum();
        assert_eq!(covered, catalogue.trade_count());
    }
}

#[test]
fn trade_indices_agree_with_section_ranges() {
    for seed in 0..200 {
        let catalogue = random_catalogue(seed);
        let compiled = compile_catalogue(&catalogue, &legacy()).expect("compile ok");
        let ranges = allocate_ranges(&catalogue);

        let mut lines = compiled.trades.iter();
        for (section, range) in catalogue.sections.iter().zip(&ranges) {
            for (offset, trade) in section.trades.iter().enumerate() {
                let line = lines.next().expect("one command per trade");
                let index = guard_index(line);
                assert_eq!(index, range.start + offset, "seed {seed}");
                assert!(range.contains(index));
                assert!(line.contains(&offer_value_json(trade).expect("json")));
            }
        }
        assert!(lines.next().is_none());
    }
}

#[test]
fn slot_pairs_match_maximum_quantity() {
    for seed in 0..200 {
        let catalogue = random_catalogue(seed);
        let compiled = compile_catalogue(&catalogue, &legacy()).expect("compile ok");
        assert_eq!(compiled.selector.len() as u64, 2 * catalogue.slot_count(), "seed {seed}");

        let mut pairs = compiled.selector.chunks(2);
        for (section, range) in catalogue.sections.iter().zip(allocate_ranges(&catalogue)) {
            for _ in 0..section.maximum_quantity {
                let pair = pairs.next().expect("pair");
                assert_eq!(sample_bounds(&pair[0]), (range.start, range.end()));
                assert!(pair[1].starts_with("execute as @s run function "));
            }
        }
        assert!(pairs.next().is_none());
    }
}

#[test]
fn skip_policy_drops_only_empty_sections() {
    for seed in 0..200 {
        let catalogue = random_catalogue(seed);
        let compiled = compile_catalogue(&catalogue, &CompileOptions::default()).expect("compile ok");
        let drawable: u64 = catalogue
            .sections
            .iter()
            .filter(|s| !s.trades.is_empty())
            .map(|s| u64::from(s.maximum_quantity))
            .sum();
        assert_eq!(compiled.selector.len() as u64, 2 * drawable, "seed {seed}");
        for pair in compiled.selector.chunks(2) {
            let (start, end) = sample_bounds(&pair[0]);
            assert!(start <= end, "seed {seed}: inverted range emitted under skip");
        }
    }
}

#[test]
fn compilation_is_deterministic() {
    for seed in 0..50 {
        let catalogue = random_catalogue(seed);
        let first = compile_catalogue(&catalogue, &legacy()).expect("compile ok");
        let second = compile_catalogue(&catalogue.clone(), &legacy()).expect("compile ok");
        assert_eq!(first, second);
    }
}

#[test]
fn key_survives_price_and_use_tuning() {
    let base = TradeDef::new("minecraft:gravel", 2, "minecraft:flint", 1, 0.05, 4);
    let mut tuned = base.clone();
    tuned.price_multiplier = 0.25;
    tuned.max_uses = 64;

    assert_eq!(offer_key_json(&base).unwrap(), offer_key_json(&tuned).unwrap());
    assert_ne!(offer_value_json(&base).unwrap(), offer_value_json(&tuned).unwrap());

    let mut other_pair = base.clone();
    other_pair.sell_item = "minecraft:dirt".into();
    assert_ne!(offer_key_json(&base).unwrap(), offer_key_json(&other_pair).unwrap());
}

#[test]
fn second_section_starts_after_first_regardless_of_slots() {
    for first_slots in [0, 1, 5] {
        let mut first = SectionDef::new("First", first_slots);
        for item in ["minecraft:coal", "minecraft:clay_ball", "minecraft:gravel"] {
            first.trades.push(TradeDef::new(item, 1, "minecraft:emerald", 1, 0.05, 4));
        }
        let second = SectionDef::new("Second", 1)
            .with_trade(TradeDef::new("minecraft:cactus", 8, "minecraft:emerald", 1, 0.05, 4))
            .with_trade(TradeDef::new("minecraft:vine", 4, "minecraft:emerald", 1, 0.05, 4));
        let catalogue = CatalogueDef {
            sections: vec![first, second],
        };

        let ranges = allocate_ranges(&catalogue);
        assert_eq!((ranges[0].start, ranges[0].end()), (1, 3));
        assert_eq!((ranges[1].start, ranges[1].end()), (4, 5));

        let compiled = compile_catalogue(&catalogue, &CompileOptions::default()).expect("compile ok");
        assert_eq!(guard_index(&compiled.trades[3]), 4);
        assert!(compiled.trades[3].contains(r#"{"id":"minecraft:cactus","count":8}"#));
        assert!(compiled.selector.last().is_some_and(|l| l.starts_with("execute as @s")));
        assert_eq!(
            sample_bounds(&compiled.selector[compiled.selector.len() - 2]),
            (4, 5)
        );
    }
}
