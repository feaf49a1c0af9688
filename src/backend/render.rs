//! Renders expression trees as JavaScript source.
//!
//! This is the only place that knows target syntax. A scoped binding form
//! becomes one immediately invoked arrow function:
//!
//! ```text
//! (() => { const f1 = (x) => square(x); return Plot.OfX({"y": f1}); })()
//! ```

use itertools::Itertools;

use crate::backend::models::{Expr, Literal, Pattern};

/// Render an expression as JavaScript
pub fn to_js(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => literal(lit),
        Expr::Ident(id) => id.to_string(),
        Expr::Let { bindings, body } => {
            let consts = bindings
                .iter()
                .map(|(name, value)| format!("const {} = {};", name, to_js(value)))
                .join(" ");
            format!("(() => {{ {} return {}; }})()", consts, to_js(body))
        }
        Expr::Lambda { params, body } => {
            let params = params.iter().map(pattern).join(", ");
            let body = match body.as_ref() {
                // Object literal body must be parenthesized to not read as a block
                obj @ Expr::Object(_) => format!("({})", to_js(obj)),
                other => to_js(other),
            };
            format!("({}) => {}", params, body)
        }
        Expr::Call { callee, args } => {
            let args = args.iter().map(to_js).join(", ");
            format!("{}({})", operand(callee), args)
        }
        Expr::Array(items) => format!("[{}]", items.iter().map(to_js).join(", ")),
        Expr::Object(fields) => {
            let fields = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", string(k), to_js(v)))
                .join(", ");
            format!("{{{}}}", fields)
        }
        Expr::Index { target, index } => format!("{}[{}]", operand(target), index),
        Expr::StoreRead { store, param } => {
            format!("{}.current({})", store.name(), string(param.name()))
        }
        Expr::Host(callable) => callable.name().to_string(),
    }
}

/// Render in callee/target position, parenthesizing where needed
fn operand(expr: &Expr) -> String {
    match expr {
        Expr::Lambda { .. } | Expr::Object(_) => format!("({})", to_js(expr)),
        other => to_js(other),
    }
}

fn pattern(p: &Pattern) -> String {
    match p {
        Pattern::Ident(id) => id.to_string(),
        Pattern::Vector(ids) => format!("[{}]", ids.iter().join(", ")),
    }
}

fn literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(n) if n.is_nan() => "NaN".to_string(),
        Literal::Number(n) if n.is_infinite() => {
            if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
        }
        Literal::Number(n) => format!("{}", n),
        Literal::Bool(b) => b.to_string(),
        Literal::Str(s) => string(s),
        Literal::Null => "null".to_string(),
    }
}

/// JSON-style quoted string
fn string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
