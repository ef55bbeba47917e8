//! Domain model: vocabulary terms, literal aliases and scenario scopes

use crate::bindings::{ArgValue, Bindings};
use crate::error::ModelError;
use crate::expr::{is_identifier, AssignOp, BinaryOp, Expr, Expression, Statement, UnaryOp};
use crate::value::Value;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Name of the namespace that is only live inside a scenario scope
pub const SCENARIO_NAMESPACE: &str = "scenario";

/// Names that can never be declared
const RESERVED_NAMES: &[&str] = &[
    SCENARIO_NAMESPACE,
    "and",
    "or",
    "not",
    "in",
    "new",
    "del",
    "True",
    "true",
    "False",
    "false",
    "None",
    "none",
];

/// Declared vocabulary term: an insertion-ordered bag of attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Term {
    attributes: IndexMap<String, Value>,
}

impl Term {
    /// Attribute value, if it was ever assigned
    #[inline]
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Attributes in assignment order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Result of evaluating one expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Expression produced a value
    Value(Value),
    /// Statement ran for its effect (declaration, assignment)
    Executed,
}

impl Outcome {
    /// Whether the expression evaluated to exactly `False`
    ///
    /// Only a literal `False` fails a guard; `None`, `0` and empty
    /// collections do not.
    #[inline]
    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Self::Value(Value::Bool(false)))
    }
}

/// Mutable model that guards and effects are evaluated against
///
/// Cloning produces a fully independent copy: terms hold values, never
/// shared handles, so the search can fork a branch with `clone()`.
#[derive(Debug, Clone, Default)]
pub struct DomainModel {
    terms: IndexMap<String, Term>,
    aliases: IndexMap<String, Value>,
    scopes: Vec<IndexMap<String, Value>>,
}

impl PartialEq for DomainModel {
    /// Models are equal when their declared terms and attributes are
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}

impl Eq for DomainModel {}

impl DomainModel {
    /// Create an empty model
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new vocabulary term
    pub fn declare(&mut self, name: &str) -> Result<(), ModelError> {
        if RESERVED_NAMES.contains(&name)
            || self.terms.contains_key(name)
            || self.aliases.contains_key(name)
        {
            return Err(ModelError::NamingConflict {
                name: name.to_string(),
            });
        }
        self.terms.insert(name.to_string(), Term::default());
        Ok(())
    }

    /// Remove a declared term and its attributes
    pub fn undeclare(&mut self, name: &str) -> Result<(), ModelError> {
        self.terms
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| ModelError::UndeclaredTerm {
                name: name.to_string(),
            })
    }

    /// Whether `name` is a declared term
    #[inline]
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    /// Declared term by name
    #[inline]
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.get(name)
    }

    /// Value of a literal alias bound during evaluation
    #[inline]
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&Value> {
        self.aliases.get(name)
    }

    /// Open a scenario scope; reads see everything visible in the enclosing scope
    pub fn push_scenario_scope(&mut self) {
        let inherited = self.scopes.last().cloned().unwrap_or_default();
        self.scopes.push(inherited);
    }

    /// Close the innermost scenario scope
    ///
    /// Values of names that were visible in the enclosing scope are carried
    /// back into it; names first written in the closed scope disappear.
    pub fn pop_scenario_scope(&mut self) -> Result<(), ModelError> {
        let closed = self.scopes.pop().ok_or(ModelError::ScopeInactive)?;
        if let Some(parent) = self.scopes.last_mut() {
            for (name, value) in closed {
                if let Some(slot) = parent.get_mut(&name) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    /// Number of open scenario scopes
    #[inline]
    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Parse and evaluate expression text
    pub fn evaluate_str(&mut self, source: &str, bindings: &Bindings) -> Result<Outcome, ModelError> {
        let expression = Expression::parse(source)?;
        self.evaluate(&expression, bindings)
    }

    /// Evaluate an expression, applying its effects to this model
    ///
    /// A bare undeclared name is an existence check and yields `False`.
    /// Inside larger expressions an undeclared name that one of the step
    /// arguments supplied verbatim is bound as a literal alias of that text
    /// and evaluation is retried.
    pub fn evaluate(
        &mut self,
        expression: &Expression,
        bindings: &Bindings,
    ) -> Result<Outcome, ModelError> {
        let mut aliased = 0;
        loop {
            match self.execute(expression.statement(), bindings) {
                Err(ModelError::UndeclaredTerm { .. }) if expression.is_bare_reference() => {
                    return Ok(Outcome::Value(Value::Bool(false)));
                }
                Err(ModelError::UndeclaredTerm { name })
                    if aliased < bindings.len()
                        && bindings.supplies(&name)
                        && !self.aliases.contains_key(&name)
                        && !self.terms.contains_key(&name) =>
                {
                    tracing::trace!(alias = %name, expression = %expression, "binding literal alias");
                    self.aliases.insert(name.clone(), Value::Str(name));
                    aliased += 1;
                }
                other => return other,
            }
        }
    }

    /// Human-readable dump of terms and the innermost scenario scope
    #[must_use]
    pub fn status(&self) -> String {
        let mut out = String::new();
        let scenario = self.scopes.last().map(|scope| (SCENARIO_NAMESPACE, scope));
        let terms = self.terms.iter().map(|(name, term)| (name.as_str(), &term.attributes));
        for (name, attributes) in terms.chain(scenario) {
            if attributes.is_empty() {
                let _ = writeln!(out, "{name}");
                continue;
            }
            let _ = writeln!(out, "{name}:");
            for (attr, value) in attributes {
                let _ = writeln!(out, "    {attr} = {value}");
            }
        }
        out
    }

    fn execute(&mut self, statement: &Statement, bindings: &Bindings) -> Result<Outcome, ModelError> {
        match statement {
            Statement::Declare(name) => self.declare(name).map(|()| Outcome::Executed),
            Statement::Undeclare(name) => self.undeclare(name).map(|()| Outcome::Executed),
            Statement::Assign {
                base,
                attribute,
                op,
                value,
            } => {
                let owner = match self.eval(base, bindings)? {
                    Value::Term(owner) => owner,
                    other => {
                        return Err(ModelError::type_error(format!(
                            "cannot set attribute '{attribute}' on a {} value",
                            other.type_name()
                        )))
                    }
                };
                let rhs = self.eval(value, bindings)?;
                let updated = match op {
                    AssignOp::Set => rhs,
                    AssignOp::Add => add_assign(self.read_attribute(&owner, attribute)?, rhs)?,
                    AssignOp::Remove => {
                        remove_assign(self.read_attribute(&owner, attribute)?, rhs)?
                    }
                };
                self.write_attribute(&owner, attribute, updated)?;
                Ok(Outcome::Executed)
            }
            Statement::Expr(expr) => self.eval(expr, bindings).map(Outcome::Value),
        }
    }

    fn eval(&self, expr: &Expr, bindings: &Bindings) -> Result<Value, ModelError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Name(name) => self.resolve_name(name),
            Expr::Placeholder { variadic, name } => {
                let bound = bindings.get(name).ok_or_else(|| ModelError::UnboundArgument {
                    name: name.clone(),
                })?;
                match (bound, *variadic) {
                    (ArgValue::Scalar(text), false) => self.resolve_text(text),
                    (ArgValue::Scalar(text), true) => Ok(Value::List(vec![self.resolve_text(text)?])),
                    (ArgValue::List(items), _) => items
                        .iter()
                        .map(|text| self.resolve_text(text))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::List),
                }
            }
            Expr::Attribute(base, attribute) => match self.eval(base, bindings)? {
                Value::Term(owner) => self.read_attribute(&owner, attribute),
                other => Err(ModelError::type_error(format!(
                    "a {} value has no attribute '{attribute}'",
                    other.type_name()
                ))),
            },
            Expr::List(items) => items
                .iter()
                .map(|item| self.eval(item, bindings))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Expr::Unary(UnaryOp::Not, operand) => {
                Ok(Value::Bool(!self.eval(operand, bindings)?.truthy()))
            }
            Expr::Unary(UnaryOp::Neg, operand) => match self.eval(operand, bindings)? {
                Value::Int(i) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| ModelError::type_error("integer overflow")),
                other => Err(ModelError::type_error(format!(
                    "cannot negate a {} value",
                    other.type_name()
                ))),
            },
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                let result = self.eval(lhs, bindings)?.truthy() && self.eval(rhs, bindings)?.truthy();
                Ok(Value::Bool(result))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                let result = self.eval(lhs, bindings)?.truthy() || self.eval(rhs, bindings)?.truthy();
                Ok(Value::Bool(result))
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs, bindings)?;
                let r = self.eval(rhs, bindings)?;
                binary(*op, &l, &r)
            }
            Expr::Call(function, args) => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a, bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                call(function, &args)
            }
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Value, ModelError> {
        if name == SCENARIO_NAMESPACE {
            return if self.scopes.is_empty() {
                Err(ModelError::ScopeInactive)
            } else {
                Ok(Value::Term(name.to_string()))
            };
        }
        if self.terms.contains_key(name) {
            return Ok(Value::Term(name.to_string()));
        }
        self.aliases
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UndeclaredTerm {
                name: name.to_string(),
            })
    }

    /// Source-code form of argument text: a literal, a name, or else a string
    fn resolve_text(&self, text: &str) -> Result<Value, ModelError> {
        if let Some(literal) = Value::parse_literal(text) {
            return Ok(literal);
        }
        if is_identifier(text) {
            return self.resolve_name(text);
        }
        Ok(Value::Str(text.to_string()))
    }

    fn read_attribute(&self, owner: &str, attribute: &str) -> Result<Value, ModelError> {
        let attributes = if owner == SCENARIO_NAMESPACE {
            self.scopes.last().ok_or(ModelError::ScopeInactive)?
        } else {
            &self
                .terms
                .get(owner)
                .ok_or_else(|| ModelError::UndeclaredTerm {
                    name: owner.to_string(),
                })?
                .attributes
        };
        attributes
            .get(attribute)
            .cloned()
            .ok_or_else(|| ModelError::AttributeUnset {
                term: owner.to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn write_attribute(&mut self, owner: &str, attribute: &str, value: Value) -> Result<(), ModelError> {
        let attributes = if owner == SCENARIO_NAMESPACE {
            self.scopes.last_mut().ok_or(ModelError::ScopeInactive)?
        } else {
            &mut self
                .terms
                .get_mut(owner)
                .ok_or_else(|| ModelError::UndeclaredTerm {
                    name: owner.to_string(),
                })?
                .attributes
        };
        attributes.insert(attribute.to_string(), value);
        Ok(())
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, ModelError> {
    let mismatch = || {
        ModelError::type_error(format!(
            "unsupported operands for '{}': {} and {}",
            op.symbol(),
            l.type_name(),
            r.type_name()
        ))
    };
    let overflow = || ModelError::type_error("integer overflow");

    match op {
        BinaryOp::Eq => Ok(Value::Bool(l == r)),
        BinaryOp::Ne => Ok(Value::Bool(l != r)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (l, r) {
                (Value::Int(a), Value::Int(b)) => a.cmp(b),
                (Value::Str(a), Value::Str(b)) => a.cmp(b),
                _ => return Err(mismatch()),
            };
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::In | BinaryOp::NotIn => {
            let found = match (l, r) {
                (item, Value::List(items)) => items.contains(item),
                (Value::Str(needle), Value::Str(haystack)) => haystack.contains(needle.as_str()),
                _ => return Err(mismatch()),
            };
            Ok(Value::Bool(found == (op == BinaryOp::In)))
        }
        BinaryOp::Add => match (l, r) {
            (Value::Int(a), Value::Int(b)) => a.checked_add(*b).map(Value::Int).ok_or_else(overflow),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => Ok(Value::List(a.iter().chain(b).cloned().collect())),
            _ => Err(mismatch()),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (Value::Int(a), Value::Int(b)) = (l, r) else {
                return Err(mismatch());
            };
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && *b == 0 {
                return Err(ModelError::DivisionByZero);
            }
            let result = match op {
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Div => a.checked_div(*b),
                _ => a.checked_rem(*b),
            };
            result.map(Value::Int).ok_or_else(overflow)
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit operators are evaluated in eval"),
    }
}

fn add_assign(current: Value, rhs: Value) -> Result<Value, ModelError> {
    match (current, rhs) {
        (Value::List(mut items), Value::List(more)) => {
            items.extend(more);
            Ok(Value::List(items))
        }
        (Value::List(mut items), item) => {
            items.push(item);
            Ok(Value::List(items))
        }
        (l, r) => binary(BinaryOp::Add, &l, &r),
    }
}

fn remove_assign(current: Value, rhs: Value) -> Result<Value, ModelError> {
    match (current, rhs) {
        (Value::List(mut items), Value::List(remove)) => {
            for item in &remove {
                remove_first(&mut items, item)?;
            }
            Ok(Value::List(items))
        }
        (Value::List(mut items), item) => {
            remove_first(&mut items, &item)?;
            Ok(Value::List(items))
        }
        (l, r) => binary(BinaryOp::Sub, &l, &r),
    }
}

fn remove_first(items: &mut Vec<Value>, item: &Value) -> Result<(), ModelError> {
    let idx = items
        .iter()
        .position(|candidate| candidate == item)
        .ok_or_else(|| ModelError::type_error(format!("{item} is not in the list")))?;
    items.remove(idx);
    Ok(())
}

fn call(function: &str, args: &[Value]) -> Result<Value, ModelError> {
    match (function, args) {
        ("len", [Value::List(items)]) => Ok(Value::Int(count(items.len()))),
        ("len", [Value::Str(s)]) => Ok(Value::Int(count(s.chars().count()))),
        ("len", _) => Err(ModelError::type_error("len() takes one list or string")),
        _ => Err(ModelError::type_error(format!("unknown function '{function}'"))),
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
