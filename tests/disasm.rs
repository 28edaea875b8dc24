use light8080_ucode::disasm::fmt_word;
use light8080_ucode::parser::{parse_line, Line};
use light8080_ucode::vocab::JumpKind;
use light8080_ucode::MicroWord;

fn word(src: &str) -> MicroWord {
    match parse_line(src).unwrap() {
        Some(Line::Instr(w)) => w,
        other => panic!("not an instruction: {other:?}"),
    }
}

#[test]
fn canonical_source_is_reproduced() {
    for src in [
        "NOP ; NOP",
        "T1 = _a ; DO = t1 ; #end",
        "T2 = DI ; _a = sub",
        "T1 = {p}1 ; NOP ; #ld_addr",
        "NOP ; {d} = t1",
        "T2 = _h ; _h = rla ; #fp_rc, #clr_acy",
        "NOP ; cpc",
        "NOP ; sec ; #halt",
        "NOP ; NOP ; #ld_al, #decode, #setacy",
    ] {
        assert_eq!(fmt_word(&word(src)), src);
    }
}

#[test]
fn case_is_normalized() {
    assert_eq!(fmt_word(&word("t1 = _A ; do = T1 ; #END")), "T1 = _a ; DO = t1 ; #end");
}

#[test]
fn jumps_print_numeric_targets() {
    let w = MicroWord::jump(JumpKind::Call, 5).unwrap();
    assert_eq!(fmt_word(&w), "JSR 0x005");
    let w = MicroWord::jump(JumpKind::CondCall, 0xc5).unwrap();
    assert_eq!(fmt_word(&w), "TJSR 0x0c5");
}
