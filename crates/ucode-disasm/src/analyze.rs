use std::collections::{BTreeMap, HashSet, VecDeque};
use serde::Serialize;

use light8080_ucode::vocab::JumpKind;
use light8080_ucode::word::{InstrClass, FLAGS1, FLAGS2};
use light8080_ucode::{Program, DECODE_BASE};

use crate::model::read_word;

// flags1/flags2 values that leave the current sequence
const FLAGS1_HALT: u32 = 0b111;
const FLAGS2_END: u32 = 0b001;
const FLAGS2_RET: u32 = 0b011;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind { Fallthrough, Call, CondCall }

#[derive(Debug, Clone, Copy)]
pub struct Edge { pub from: u32, pub to: u32, pub kind: EdgeKind }

/// Entry point reached through the decoding table.
#[derive(Debug, Clone, Serialize)]
pub struct EntryOut { pub addr: u32, pub opcodes: Vec<u8> }

#[derive(Debug, Clone, Serialize)]
pub struct EdgeOut { pub from: u32, pub to: u32, pub kind: String }

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub entries: Vec<EntryOut>,
    pub unmatched: Vec<u8>,
    pub edges: Vec<EdgeOut>,
    pub reachable: usize,
}

/// Opcode -> entry address, read back from the JSR words of the decoding
/// table. `None` for opcodes routed to the no-match word.
///
/// The no-match word is `JSR 0`, so a `__code` pattern bound to microaddress
/// 0 encodes the same word and is reported as unmatched too. The rendered
/// table carries nothing that tells the two apart.
pub fn decode_entries(program: &Program) -> Vec<Option<u32>> {
    program
        .decode_region()
        .iter()
        .map(|w| match (w.class(), w.jump_target()) {
            (InstrClass::Jump(JumpKind::Call), Some(t)) if t != 0 => Some(u32::from(t)),
            _ => None,
        })
        .collect()
}

/// Walks the authored region from `entries`, following fallthrough and calls
/// until a word ends its sequence (`#end`, `#ret`, `#halt`).
pub fn analyze_entries(program: &Program, entries: &[u32]) -> (HashSet<u32>, Vec<Edge>) {
    let limit = DECODE_BASE as u32;
    let mut queue: VecDeque<u32> = entries.iter().copied().filter(|&e| e < limit).collect();
    let mut visited: HashSet<u32> = HashSet::new();
    let mut edges: Vec<Edge> = Vec::new();
    while let Some(pc) = queue.pop_front() {
        if !visited.insert(pc) { continue; }
        let Some(w) = read_word(program, pc) else { continue; };
        let ft = pc + 1;
        if let InstrClass::Jump(kind) = w.class() {
            let to = u32::from(w.jump_target().unwrap_or_default());
            let kind = match kind { JumpKind::Call => EdgeKind::Call, JumpKind::CondCall => EdgeKind::CondCall };
            edges.push(Edge { from: pc, to, kind });
            if to < limit { queue.push_back(to); }
        } else if w.read(FLAGS1) == FLAGS1_HALT || matches!(w.read(FLAGS2), FLAGS2_END | FLAGS2_RET) {
            continue;
        }
        if ft < limit {
            edges.push(Edge { from: pc, to: ft, kind: EdgeKind::Fallthrough });
            queue.push_back(ft);
        }
    }
    (visited, edges)
}

pub fn build_report(program: &Program) -> Report {
    let mut by_entry: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    let mut unmatched = Vec::new();
    for (op, entry) in decode_entries(program).into_iter().enumerate() {
        match entry {
            Some(addr) => by_entry.entry(addr).or_default().push(op as u8),
            None => unmatched.push(op as u8),
        }
    }
    let seeds: Vec<u32> = std::iter::once(0).chain(by_entry.keys().copied()).collect();
    let (visited, edges) = analyze_entries(program, &seeds);
    let edges = edges
        .into_iter()
        .map(|e| {
            let kind = match e.kind { EdgeKind::Fallthrough => "ft", EdgeKind::Call => "jsr", EdgeKind::CondCall => "tjsr" }.to_string();
            EdgeOut { from: e.from, to: e.to, kind }
        })
        .collect();
    Report {
        entries: by_entry.into_iter().map(|(addr, opcodes)| EntryOut { addr, opcodes }).collect(),
        unmatched,
        edges,
        reachable: visited.len(),
    }
}
