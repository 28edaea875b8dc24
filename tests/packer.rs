use light8080_ucode::decode_table::UNMATCHED_WORD;
use light8080_ucode::error::EncodingError;
use light8080_ucode::vocab::JumpKind;
use light8080_ucode::word::{
    int_to_bits, is_field_nonzero, read_field, set_field, InstrClass, MicroWord, ALU_OP, FLAGS1,
    FLAGS2, FP, JUMP_DST_H, JUMP_DST_L, RB_ADDR,
};

#[test]
fn int_to_bits_is_msb_first() {
    let bits = int_to_bits(0b1011_0001, 8).unwrap();
    let s: String = bits.iter().map(|b| if *b { '1' } else { '0' }).collect();
    assert_eq!(s, "10110001");
}

#[test]
fn int_to_bits_detects_overflow() {
    assert!(int_to_bits(255, 8).is_ok());
    assert_eq!(
        int_to_bits(256, 8).unwrap_err(),
        EncodingError::Overflow { value: 256, width: 8 }
    );
    assert!(int_to_bits(u32::MAX, 32).is_ok());
}

#[test]
fn set_field_places_bits_at_msb() {
    let mut w = MicroWord::new();
    set_field(&mut w, FLAGS2, &int_to_bits(0b010, 3).unwrap()).unwrap();
    assert_eq!(w.raw(), UNMATCHED_WORD);

    w.write(FP, 0b10).unwrap();
    assert_eq!(w.raw(), 0x0800_0200);
    assert_eq!(read_field(&w, FP), 0b10);
    assert_eq!(read_field(&w, FLAGS2), 0b010);
}

#[test]
fn set_field_rejects_wrong_width() {
    let mut w = MicroWord::new();
    let err = set_field(&mut w, RB_ADDR, &int_to_bits(1, 3).unwrap()).unwrap_err();
    assert_eq!(
        err,
        EncodingError::WidthMismatch { field: "rb_addr", expected: 4, got: 3 }
    );
    assert_eq!(w.raw(), 0);
}

#[test]
fn write_rejects_value_wider_than_field() {
    let mut w = MicroWord::new();
    assert!(w.write(FLAGS1, 0b1000).is_err());
}

#[test]
fn nonzero_detection() {
    let mut w = MicroWord::new();
    assert!(!is_field_nonzero(&w, FLAGS1));
    w.write(FLAGS1, 0b100).unwrap();
    assert!(is_field_nonzero(&w, FLAGS1));
    assert!(!is_field_nonzero(&w, FLAGS2));
}

#[test]
fn jump_target_split_across_high_and_low_fields() {
    let w = MicroWord::jump(JumpKind::Call, 0xC5).unwrap();
    assert_eq!(w.class(), InstrClass::Jump(JumpKind::Call));
    assert_eq!(w.read(JUMP_DST_H), 0b11);
    assert_eq!(w.read(JUMP_DST_L), 0b000101);
    assert_eq!(w.jump_target(), Some(0xC5));

    let t = MicroWord::jump(JumpKind::CondCall, 0x3F).unwrap();
    assert_eq!(t.read(FLAGS2), 0b100);
    assert_eq!(t.read(JUMP_DST_H), 0);
    assert_eq!(t.jump_target(), Some(0x3F));
}

#[test]
fn jump_target_only_on_jump_words() {
    let mut w = MicroWord::new();
    w.write(ALU_OP, 0b001100).unwrap();
    assert_eq!(w.class(), InstrClass::Plain);
    assert_eq!(w.set_jump_target(3), Err(EncodingError::NotAJump));
    assert_eq!(w.jump_target(), None);
}

#[test]
fn jump_target_overflow() {
    assert_eq!(
        MicroWord::jump(JumpKind::Call, 256),
        Err(EncodingError::Overflow { value: 256, width: 8 })
    );
}
