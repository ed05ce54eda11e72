//! Parser tests.


use crate::ParsedExpr;
use goeval_ir::{ChanDir, ExprId, ExprKind};

/// Render a subtree as a compact s-expression for assertions.
pub(crate) fn show(parsed: &ParsedExpr, id: ExprId) -> String {
    let arena = &parsed.arena;
    let Some(expr) = arena.get(id) else {
        return "<invalid>".to_string();
    };
    let list = |range| {
        arena
            .expr_list(range)
            .iter()
            .map(|&e| show(parsed, e))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let opt = |e: Option<ExprId>| e.map_or("_".to_string(), |e| show(parsed, e));
    let fields = |range| {
        arena
            .fields(range)
            .iter()
            .map(|g| {
                let names: Vec<&str> = arena.names(g.names).iter().map(|&n| arena.lookup(n)).collect();
                let tag = g.tag.map(|t| format!(" {}", show(parsed, t))).unwrap_or_default();
                format!("[{}: {}{tag}]", names.join(","), show(parsed, g.ty))
            })
            .collect::<Vec<_>>()
            .join(" ")
    };
    match expr.kind {
        ExprKind::Ident(name) => arena.lookup(name).to_string(),
        ExprKind::BasicLit { text, .. } => arena.lookup(text).to_string(),
        ExprKind::Paren(x) => format!("(paren {})", show(parsed, x)),
        ExprKind::Selector { x, sel } => format!("(. {} {})", show(parsed, x), arena.lookup(sel)),
        ExprKind::Index { x, index } => format!("(index {} {})", show(parsed, x), show(parsed, index)),
        ExprKind::Slice {
            x,
            low,
            high,
            max,
            slice3,
        } => {
            if slice3 {
                format!("(slice3 {} {} {} {})", show(parsed, x), opt(low), opt(high), opt(max))
            } else {
                format!("(slice {} {} {})", show(parsed, x), opt(low), opt(high))
            }
        }
        ExprKind::TypeAssert { x, ty } => format!("(assert {} {})", show(parsed, x), show(parsed, ty)),
        ExprKind::Call {
            func,
            args,
            ellipsis,
        } => format!(
            "(call {} {}{})",
            show(parsed, func),
            list(args),
            if ellipsis { " ..." } else { "" }
        ),
        ExprKind::Star(x) => format!("(* {})", show(parsed, x)),
        ExprKind::Unary { op, x } => format!("({op} {})", show(parsed, x)),
        ExprKind::Binary { op, x, y } => format!("({op} {} {})", show(parsed, x), show(parsed, y)),
        ExprKind::KeyValue { key, value } => format!("({}: {})", show(parsed, key), show(parsed, value)),
        ExprKind::CompositeLit { ty, elts } => format!("(lit {} {})", opt(ty), list(elts)),
        ExprKind::FuncLit { ty } => format!("(funclit {})", show(parsed, ty)),
        ExprKind::Ellipsis(elt) => format!("(... {})", opt(elt)),
        ExprKind::ArrayType { len, elt } => format!("(array {} {})", opt(len), show(parsed, elt)),
        ExprKind::StructType(range) => format!("(struct {})", fields(range)),
        ExprKind::FuncType { params, results } => {
            format!("(func ({}) ({}))", fields(params), fields(results))
        }
        ExprKind::InterfaceType(range) => format!("(interface {})", fields(range)),
        ExprKind::MapType { key, value } => format!("(map {} {})", show(parsed, key), show(parsed, value)),
        ExprKind::ChanType { dir, value } => {
            let dir = match dir {
                ChanDir::Both => "chan",
                ChanDir::Send => "chan<-",
                ChanDir::Recv => "<-chan",
            };
            format!("({dir} {})", show(parsed, value))
        }
        ExprKind::Bad => "bad".to_string(),
    }
}

/// Parse and render the whole tree.
pub(crate) fn parse_show(source: &str) -> String {
    let parsed = crate::parse_expr(source).unwrap();
    show(&parsed, parsed.root)
}
