// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use ordered_float::OrderedFloat;

pub type LiteralId = u16;
pub type ParamOffset = u16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op2 {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Opcode {
    Op2 { op: Op2 },
    Negate,
    LoadConstant { id: LiteralId },
    LoadParam { off: ParamOffset },
    Ret,
}

/// A compiled parameter-only expression: straight-line stack code plus
/// its interned literal pool.
#[derive(Clone, Debug, Default)]
pub struct ByteCode {
    pub(crate) literals: Vec<f64>,
    pub(crate) code: Vec<Opcode>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ByteCodeBuilder {
    bytecode: ByteCode,
    interned_literals: HashMap<OrderedFloat<f64>, LiteralId>,
}

impl ByteCodeBuilder {
    pub(crate) fn intern_literal(&mut self, lit: f64) -> LiteralId {
        let key: OrderedFloat<f64> = lit.into();
        if self.interned_literals.contains_key(&key) {
            return self.interned_literals[&key];
        }
        self.bytecode.literals.push(lit);
        let literal_id = (self.bytecode.literals.len() - 1) as u16;
        self.interned_literals.insert(key, literal_id);
        literal_id
    }

    pub(crate) fn push_opcode(&mut self, op: Opcode) {
        self.bytecode.code.push(op)
    }

    pub(crate) fn finish(self) -> ByteCode {
        self.bytecode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memoizing_interning() {
        let mut bytecode = ByteCodeBuilder::default();
        let a1 = bytecode.intern_literal(1.0);
        let b1 = bytecode.intern_literal(1.01);
        let b2 = bytecode.intern_literal(1.01);
        let a2 = bytecode.intern_literal(1.0);
        let b3 = bytecode.intern_literal(1.01);

        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!(b1, b3);
        assert_ne!(a1, b1);

        let bytecode = bytecode.finish();
        assert_eq!(vec![1.0, 1.01], bytecode.literals);
    }

    #[test]
    fn test_opcode_order_is_preserved() {
        let mut builder = ByteCodeBuilder::default();
        let id = builder.intern_literal(2.0);
        builder.push_opcode(Opcode::LoadConstant { id });
        builder.push_opcode(Opcode::LoadParam { off: 0 });
        builder.push_opcode(Opcode::Op2 { op: Op2::Mul });
        builder.push_opcode(Opcode::Ret);

        let bytecode = builder.finish();
        assert_eq!(4, bytecode.code.len());
        assert_eq!(Opcode::Ret, bytecode.code[3]);
    }
}
