/// The reduction surface driven by the formula tokenizer/parser.
///
/// This is the callback interface an infix parser emits events against,
/// described abstractly in terms of "an external collaborator" — here made
/// concrete by `super::parser::FormulaParser`, which drives a
/// [`super::builder::ExpressionBuilder`] through these calls in
/// reverse-Polish order as it walks the formula text. Nothing downstream of
/// parsing needs to know the parser exists; it is entirely described by the
/// sequence of calls it makes here.
pub trait ReductionSink {
    fn val_number(&mut self, value: f64);
    fn val_string(&mut self, value: String);
    fn val_reference(&mut self, text: String);
    fn val_range(&mut self, text: String);
    fn op_add(&mut self);
    fn op_sub(&mut self);
    fn op_mul(&mut self);
    fn op_div(&mut self);
    fn op_pow(&mut self);
    fn op_neg(&mut self);
    fn op_eq(&mut self);
    fn op_ne(&mut self);
    fn op_lt(&mut self);
    fn op_le(&mut self);
    fn op_gt(&mut self);
    fn op_ge(&mut self);
    fn func_call(&mut self, name: String, arg_count: usize);
}
