use pretty_assertions::assert_eq;

use light8080_ucode::render::{json, parse_table, verilog_include, vhdl_package};
use light8080_ucode::{assemble, LoadError, MicroWord, Program};

const SRC: &str = "\
:fetch
T1 = _a ; NOP ; #decode, #ld_al
__code \"00******\"
JSR fetch
NOP ; _b = add ; #fp_rc, #end
";

fn program() -> Program {
    assemble(SRC).unwrap().program
}

#[test]
fn vhdl_round_trip() {
    let program = program();
    let text = vhdl_package(&program);
    assert!(text.contains("package light8080_ucode_pkg is"));
    assert!(text.contains("type t_rom is array (0 to 511) of std_logic_vector(31 downto 0);"));
    assert!(text.contains(&format!("  \"{:032b}\", -- 000\n", program.get(0).unwrap().raw())));
    assert!(text.ends_with("end package;\n"));
    assert_eq!(parse_table(&text).unwrap(), program);
}

#[test]
fn verilog_round_trip() {
    let program = program();
    let text = verilog_include(&program);
    assert!(text.contains("reg [31:0] microcode [0:511];"));
    assert!(text.contains(&format!(
        "  microcode[9'h100] = 32'b{:032b};\n",
        program.get(256).unwrap().raw()
    )));
    assert_eq!(parse_table(&text).unwrap(), program);
}

#[test]
fn json_round_trip() {
    let program = program();
    let text = json(&program).unwrap();
    assert!(text.trim_start().starts_with('['));
    assert_eq!(parse_table(&text).unwrap(), program);
}

#[test]
fn short_tables_are_rejected() {
    let words: Vec<MicroWord> = program().words()[..100].to_vec();
    assert_eq!(
        Program::from_words(words).unwrap_err(),
        LoadError::WrongLength { got: 100, expected: 512 }
    );

    let text = "  \"00000000000000000000000000000000\", -- 000\n";
    assert_eq!(
        parse_table(text).unwrap_err(),
        LoadError::WrongLength { got: 1, expected: 512 }
    );

    assert!(matches!(parse_table("[1, 2, 3]"), Err(LoadError::Json(_))));
}

#[test]
fn malformed_literals_are_rejected() {
    let text = "-- header\n  \"0000000000000000000000000000002\", -- 000\n";
    assert_eq!(
        parse_table(text).unwrap_err(),
        LoadError::BadLiteral { line: 2, text: "0000000000000000000000000000002".into() }
    );

    let text = "  microcode[9'h000] = 32'b0101;\n";
    assert_eq!(
        parse_table(text).unwrap_err(),
        LoadError::BadLiteral { line: 1, text: "0101".into() }
    );
}

#[test]
fn underscores_in_literals_are_ignored() {
    let program = program();
    let mut text = String::new();
    for w in program.words() {
        let bits = format!("{:032b}", w.raw());
        text.push_str(&format!("  microcode = 32'b{}_{};\n", &bits[..16], &bits[16..]));
    }
    assert_eq!(parse_table(&text).unwrap(), program);
}
