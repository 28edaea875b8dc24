//! Label bookkeeping and second-pass jump resolution.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{AsmError, ParseError, UndefinedLabel};
use crate::word::MicroWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelDef {
    pub address: u16,
    pub line: usize,
}

/// Label name -> microaddress of the instruction that follows the label.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    defs: HashMap<String, LabelDef>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, address: u16, line: usize) -> Result<(), ParseError> {
        if let Some(prev) = self.defs.get(name) {
            return Err(ParseError::DuplicateLabel {
                label: name.to_string(),
                first_line: prev.line,
            });
        }
        debug!(label = name, address, line, "label defined");
        self.defs.insert(name.to_string(), LabelDef { address, line });
        Ok(())
    }

    pub fn address(&self, name: &str) -> Option<u16> {
        self.defs.get(name).map(|d| d.address)
    }

    pub fn get(&self, name: &str) -> Option<&LabelDef> {
        self.defs.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Jump emitted in pass 1 whose target is filled in by pass 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJump {
    pub label: String,
    pub line: usize,
    pub text: String,
}

/// One pass-1 output slot, in address order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub word: MicroWord,
    pub line: usize,
    pub pending: Option<PendingJump>,
}

/// Pass 2: patch every pending jump with its label's address.
///
/// All undefined labels are collected before failing.
pub fn resolve_jumps(emitted: &[Emitted], labels: &LabelTable) -> Result<Vec<MicroWord>, AsmError> {
    let mut words = Vec::with_capacity(emitted.len());
    let mut undefined = Vec::new();
    for (address, slot) in emitted.iter().enumerate() {
        let mut word = slot.word;
        if let Some(jump) = &slot.pending {
            match labels.address(&jump.label) {
                Some(target) => {
                    trace!(from = address, to = target, label = %jump.label, "jump resolved");
                    word.set_jump_target(target)?;
                }
                None => undefined.push(UndefinedLabel {
                    line: jump.line,
                    label: jump.label.clone(),
                    text: jump.text.clone(),
                }),
            }
        }
        words.push(word);
    }
    if undefined.is_empty() {
        Ok(words)
    } else {
        Err(AsmError::UndefinedLabels(undefined))
    }
}
