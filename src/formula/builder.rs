use super::ast::{Expr, OpKind};
use super::sink::ReductionSink;
use crate::constants::ABSOLUTE_MARKER;
use crate::types::Value;

/// Consumes reduction events from the formula parser and assembles an
/// [`Expr`] tree on an explicit operand stack.
///
/// The finished tree is *not* simply "whatever is left on the stack" — it
/// is the node produced by the last reduction, tracked separately as
/// `last`. Every method below updates `last` except [`Self::val_range`] and
/// the stack-padding branch of [`Self::func_call`]; a formula that reduces
/// to nothing but a bare range therefore has no root and `finish` returns
/// `None`, which the caller treats as a parse failure.
#[derive(Debug, Default)]
pub struct ExpressionBuilder {
    stack: Vec<Expr>,
    last: Option<Expr>,
}

impl ExpressionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_binary(&mut self, kind: OpKind) {
        let right = self.stack.pop().expect("reduction sequence is well-formed");
        let left = self.stack.pop().expect("reduction sequence is well-formed");
        let node = Expr::Op {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        };
        self.stack.push(node.clone());
        self.last = Some(node);
    }

    /// Consume the builder and return the root of the finished tree, or
    /// `None` if no reduction ever produced one (e.g. the formula was a
    /// bare range token).
    pub fn finish(self) -> Option<Expr> {
        self.last
    }
}

impl ReductionSink for ExpressionBuilder {
    fn val_number(&mut self, value: f64) {
        let node = Expr::Value(Value::Number(value));
        self.stack.push(node.clone());
        self.last = Some(node);
    }

    fn val_string(&mut self, value: String) {
        let node = Expr::Value(Value::Text(value));
        self.stack.push(node.clone());
        self.last = Some(node);
    }

    fn val_reference(&mut self, text: String) {
        let normalized: String = text
            .chars()
            .filter(|&c| c != ABSOLUTE_MARKER)
            .flat_map(|c| c.to_lowercase())
            .collect();
        let node = Expr::Ref(normalized);
        self.stack.push(node.clone());
        self.last = Some(node);
    }

    fn val_range(&mut self, text: String) {
        self.stack.push(Expr::Value(Value::Text(text)));
    }

    fn op_add(&mut self) {
        self.push_binary(OpKind::Add);
    }

    fn op_sub(&mut self) {
        self.push_binary(OpKind::Sub);
    }

    fn op_mul(&mut self) {
        self.push_binary(OpKind::Mul);
    }

    fn op_div(&mut self) {
        self.push_binary(OpKind::Div);
    }

    fn op_pow(&mut self) {
        self.push_binary(OpKind::Pow);
    }

    fn op_neg(&mut self) {
        let left = self.stack.pop().expect("reduction sequence is well-formed");
        let node = Expr::Op {
            kind: OpKind::Neg,
            left: Box::new(left),
            right: Box::new(Expr::Value(Value::Empty)),
        };
        self.stack.push(node.clone());
        self.last = Some(node);
    }

    fn op_eq(&mut self) {
        self.push_binary(OpKind::Eq);
    }

    fn op_ne(&mut self) {
        self.push_binary(OpKind::Ne);
    }

    fn op_lt(&mut self) {
        self.push_binary(OpKind::Lt);
    }

    fn op_le(&mut self) {
        self.push_binary(OpKind::Le);
    }

    fn op_gt(&mut self) {
        self.push_binary(OpKind::Gt);
    }

    fn op_ge(&mut self) {
        self.push_binary(OpKind::Ge);
    }

    fn func_call(&mut self, _name: String, arg_count: usize) {
        if self.stack.len() < arg_count {
            self.stack.push(Expr::Value(Value::Empty));
        }
    }
}
