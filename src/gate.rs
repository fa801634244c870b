//! Gates and the evaluating circuit behind a proposition network's derived logic.
//!
//! Terminal and legality conditions are signals over a [`Circuit`]: a topologically ordered
//! list of gates whose inputs are base-proposition state bits, constants, or earlier gates.

use crate::bitset::BitSet;
use crate::signal::Signal;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BinaryType {
    And,
    Or,
    Xor,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NaryType {
    And,
    Or,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Gate {
    Binary(BinaryType, [Signal; 2]),
    Nary(NaryType, Box<[Signal]>),
}

// Constructors
impl Gate {
    pub fn and(a: Signal, b: Signal) -> Gate {
        Gate::Binary(BinaryType::And, [a, b])
    }

    pub fn or(a: Signal, b: Signal) -> Gate {
        Gate::Binary(BinaryType::Or, [a, b])
    }

    pub fn xor(a: Signal, b: Signal) -> Gate {
        Gate::Binary(BinaryType::Xor, [a, b])
    }

    pub fn andn(signals: &[Signal]) -> Gate {
        Gate::Nary(NaryType::And, signals.into())
    }

    pub fn orn(signals: &[Signal]) -> Gate {
        Gate::Nary(NaryType::Or, signals.into())
    }
}

// Getters
impl Gate {
    pub fn inputs(&self) -> &[Signal] {
        match self {
            Gate::Binary(_, inputs) => inputs,
            Gate::Nary(_, inputs) => inputs,
        }
    }
}

/// A combinational circuit over machine-state bits.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Append a gate and return its output signal.
    ///
    /// # Panics
    ///
    /// Panics if an input refers to a gate that does not exist yet (which would create a
    /// cycle).
    pub fn add_gate(&mut self, gate: Gate) -> Signal {
        let next = self.gates.len() as u32;
        for input in gate.inputs() {
            assert!(
                !input.is_gate() || input.gate() < next,
                "Gate input {} refers to a later gate",
                input
            );
        }
        self.gates.push(gate);
        Signal::from_gate(next)
    }

    pub fn and(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_gate(Gate::and(a, b))
    }

    pub fn or(&mut self, a: Signal, b: Signal) -> Signal {
        self.add_gate(Gate::or(a, b))
    }

    /// Evaluate `signal` in `state`.
    pub fn eval(&self, signal: Signal, state: &BitSet) -> bool {
        let mut memo: Vec<Option<bool>> = vec![None; self.gates.len()];
        self.eval_memo(signal, state, &mut memo)
    }

    fn eval_memo(&self, signal: Signal, state: &BitSet, memo: &mut [Option<bool>]) -> bool {
        let value = if signal.is_const() {
            false
        } else if signal.is_base() {
            state.contains(signal.base().index())
        } else {
            let g = signal.gate() as usize;
            match memo[g] {
                Some(v) => v,
                None => {
                    let v = self.eval_gate(&self.gates[g], state, memo);
                    memo[g] = Some(v);
                    v
                }
            }
        };
        value ^ signal.is_negated()
    }

    fn eval_gate(&self, gate: &Gate, state: &BitSet, memo: &mut [Option<bool>]) -> bool {
        match gate {
            Gate::Binary(ty, [a, b]) => {
                let a = self.eval_memo(*a, state, memo);
                let b = self.eval_memo(*b, state, memo);
                match ty {
                    BinaryType::And => a && b,
                    BinaryType::Or => a || b,
                    BinaryType::Xor => a ^ b,
                }
            }
            Gate::Nary(NaryType::And, inputs) => inputs.iter().all(|&s| self.eval_memo(s, state, memo)),
            Gate::Nary(NaryType::Or, inputs) => inputs.iter().any(|&s| self.eval_memo(s, state, memo)),
        }
    }
}
