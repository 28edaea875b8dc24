use light8080_ucode::decode_table::{synthesize, OpcodePattern, PatternSet, TieBreak, UNMATCHED_WORD};
use light8080_ucode::error::ParseError;

fn set(patterns: &[(&str, u16)]) -> PatternSet {
    let mut set = PatternSet::new();
    for (line, (text, entry)) in patterns.iter().enumerate() {
        set.register(OpcodePattern::parse(text, *entry, line + 1).unwrap())
            .unwrap();
    }
    set
}

#[test]
fn pattern_syntax() {
    let p = OpcodePattern::parse("\"0000110*\"", 3, 9).unwrap();
    assert_eq!(p.text(), "0000110*");
    assert_eq!(p.cost(), 1);
    assert_eq!((p.entry, p.line), (3, 9));

    // anything that is not 0 or 1 is a wildcard
    assert_eq!(OpcodePattern::parse("01xx?*ab", 0, 1).unwrap().cost(), 6);

    assert_eq!(
        OpcodePattern::parse("0000110", 0, 1).unwrap_err(),
        ParseError::InvalidPattern("0000110".into())
    );
    assert_eq!(
        OpcodePattern::parse("0000 110", 0, 1).unwrap_err(),
        ParseError::InvalidPattern("0000 110".into())
    );
}

#[test]
fn matching_is_msb_first() {
    let p = OpcodePattern::parse("01******", 0, 1).unwrap();
    assert!(p.matches(0x40));
    assert!(p.matches(0x7f));
    assert!(!p.matches(0x3f));
    assert!(!p.matches(0x80));

    let p = OpcodePattern::parse("*******1", 0, 1).unwrap();
    assert!(p.matches(0x01));
    assert!(!p.matches(0x80));
}

#[test]
fn most_specific_pattern_wins_regardless_of_order() {
    for patterns in [
        [("0000110*", 10), ("00001100", 20)],
        [("00001100", 20), ("0000110*", 10)],
    ] {
        let set = set(&patterns);
        let exact = set.best_match(0x0c, TieBreak::FirstRegistered).unwrap();
        assert_eq!(exact.map(|p| p.entry), Some(20));
        let wild = set.best_match(0x0d, TieBreak::FirstRegistered).unwrap();
        assert_eq!(wild.map(|p| p.entry), Some(10));
        assert_eq!(set.best_match(0x0e, TieBreak::Reject).unwrap(), None);
    }
}

#[test]
fn equal_cost_tie_keeps_first_registered() {
    let set = set(&[("0000****", 1), ("****0000", 2)]);
    let hit = set.best_match(0x00, TieBreak::FirstRegistered).unwrap();
    assert_eq!(hit.map(|p| p.entry), Some(1));
    assert_eq!(TieBreak::default(), TieBreak::FirstRegistered);
}

#[test]
fn equal_cost_tie_can_be_rejected() {
    let set = set(&[("0000****", 1), ("****0000", 2)]);
    let amb = set.best_match(0x00, TieBreak::Reject).unwrap_err();
    assert_eq!(amb.opcode, 0);
    assert_eq!(amb.first.text(), "0000****");
    assert_eq!(amb.second.text(), "****0000");

    // only one of them matches 0x01
    let hit = set.best_match(0x01, TieBreak::Reject).unwrap();
    assert_eq!(hit.map(|p| p.entry), Some(1));

    let err = synthesize(&set, TieBreak::Reject).unwrap_err().into_parse_error();
    assert_eq!(
        err,
        ParseError::AmbiguousOpcode {
            opcode: 0,
            first: "0000****".into(),
            first_line: 1,
            second: "****0000".into(),
        }
    );
}

#[test]
fn tie_above_the_minimum_cost_is_not_ambiguous() {
    let set = set(&[("0000****", 1), ("****0000", 2), ("00000000", 3)]);
    for tie in [TieBreak::Reject, TieBreak::FirstRegistered] {
        let hit = set.best_match(0x00, tie).unwrap();
        assert_eq!(hit.map(|p| p.entry), Some(3));
    }

    let table = synthesize(&set, TieBreak::Reject).unwrap();
    assert_eq!(table.get(0x00), Some(3));
    assert_eq!(table.get(0x0f), Some(1));
    assert_eq!(table.get(0xf0), Some(2));
}

#[test]
fn duplicate_pattern_is_rejected() {
    let mut set = set(&[("01******", 4)]);
    // quotes are stripped before comparing
    let err = set
        .register(OpcodePattern::parse("\"01******\"", 9, 7).unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::DuplicatePattern { pattern: "01******".into(), first_line: 1 }
    );
    assert_eq!(set.len(), 1);
}

#[test]
fn table_words() {
    let table = synthesize(&set(&[("01******", 5)]), TieBreak::FirstRegistered).unwrap();
    assert_eq!(table.matched(), 64);
    assert_eq!(table.get(0x40), Some(5));
    assert_eq!(table.get(0x00), None);

    let words = table.words().unwrap();
    assert_eq!(words.len(), 256);
    assert_eq!(words[0x40].raw(), 0x0800_0005);
    assert_eq!(words[0x7f].raw(), 0x0800_0005);
    assert_eq!(words[0x00].raw(), UNMATCHED_WORD);
    assert_eq!(words[0xff].raw(), UNMATCHED_WORD);
}

#[test]
fn empty_pattern_set_routes_everything_to_zero() {
    let table = synthesize(&PatternSet::new(), TieBreak::Reject).unwrap();
    assert_eq!(table.matched(), 0);
    assert!(table.iter().all(|(_, e)| e.is_none()));
    assert!(table.words().unwrap().iter().all(|w| w.raw() == UNMATCHED_WORD));
}
