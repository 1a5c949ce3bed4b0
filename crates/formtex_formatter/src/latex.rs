//! Order-preserving LaTeX rendering.
//!
//! Emits operands in the order they were built, so `b + a` stays `b + a`.
//! Layout follows common computer-algebra conventions: `\frac` for
//! division, `\left( \right)` for grouping, `\sin{\left(x \right)}` for
//! function calls, and `\int`, `\frac{d}{d x}`, `\sum`, `\lim` for the
//! calculus constructs. Highlighted nodes are wrapped in a `\color`
//! directive around everything they render, parentheses included.

use std::collections::BTreeSet;

use formtex_ast::catalog::{self, BuiltinFn};
use formtex_ast::symbol::split_subscript;
use formtex_ast::traversal::collect_symbol_names;
use formtex_ast::{
    Constant, Context, Expr, ExprId, IntegrationLimit, LimitDirection, Statement, Symbol,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::color::Color;
use crate::highlight::HighlightConfig;

// ============================================================================
// Leaf rendering
// ============================================================================

/// Render a rational number. Terminating decimals keep their decimal form.
pub fn render_number(n: &BigRational) -> String {
    if n.is_integer() {
        return n.numer().to_string();
    }
    if let Some(decimal) = terminating_decimal(n) {
        return decimal;
    }
    let sign = if n.is_negative() { "-" } else { "" };
    format!("{sign}\\frac{{{}}}{{{}}}", n.numer().abs(), n.denom())
}

/// Decimal spelling of `n` when its denominator is `2^a 5^b`.
fn terminating_decimal(n: &BigRational) -> Option<String> {
    let two = BigInt::from(2);
    let five = BigInt::from(5);
    let mut rest = n.denom().clone();
    let mut twos = 0u32;
    let mut fives = 0u32;

    while (&rest % &two).is_zero() {
        rest /= &two;
        twos += 1;
    }
    while (&rest % &five).is_zero() {
        rest /= &five;
        fives += 1;
    }
    if !rest.is_one() {
        return None;
    }

    let places = twos.max(fives) as usize;
    let scaled = n.numer().abs() * BigInt::from(10).pow(places as u32) / n.denom();
    let digits = format!("{:0>width$}", scaled.to_string(), width = places + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - places);
    let sign = if n.is_negative() { "-" } else { "" };
    Some(format!("{sign}{int_part}.{frac_part}"))
}

pub fn render_constant(c: Constant) -> &'static str {
    match c {
        Constant::Pi => "\\pi",
        Constant::E => "e",
        Constant::Infinity => "\\infty",
    }
}

/// Greek names become commands, anything else is kept verbatim.
fn spell_part(part: &str) -> String {
    match catalog::greek_letter(part) {
        Some(letter) => letter.latex.to_string(),
        None if part == "pi" => "\\pi".to_string(),
        None => part.to_string(),
    }
}

/// Render a free symbol name.
///
/// `x_1` → `x_{1}`, `alpha_k` → `\alpha_{k}`, `x1` → `x_{1}`,
/// `speed` → `speed`.
pub fn render_symbol_name(name: &str) -> String {
    if let (base, Some(sub)) = split_subscript(name) {
        return format!("{}_{{{}}}", spell_part(base), spell_part(sub));
    }

    let digits_at = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    match digits_at {
        Some(i) if i > 0 => format!("{}_{{{}}}", spell_part(&name[..i]), &name[i..]),
        _ => spell_part(name),
    }
}

// ============================================================================
// LatexRenderer
// ============================================================================

/// Renders nodes of one [`Context`], applying optional highlights.
pub struct LatexRenderer<'a> {
    pub context: &'a Context,
    pub highlights: Option<&'a HighlightConfig>,
}

impl<'a> LatexRenderer<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            highlights: None,
        }
    }

    pub fn with_highlights(mut self, highlights: &'a HighlightConfig) -> Self {
        self.highlights = Some(highlights);
        self
    }

    /// Render a statement; an equation renders as `lhs = rhs`.
    pub fn statement_to_latex(&self, statement: &Statement) -> String {
        match statement {
            Statement::Expression(id) => self.expr_to_latex(*id),
            Statement::Equation(eq) => format!(
                "{} = {}",
                self.expr_to_latex(eq.lhs),
                self.expr_to_latex(eq.rhs)
            ),
        }
    }

    pub fn expr_to_latex(&self, id: ExprId) -> String {
        self.expr(id, false)
    }

    fn color(&self, id: ExprId) -> Option<&Color> {
        self.highlights.and_then(|h| h.get(id))
    }

    /// Render `id`, grouping it when `parens` is set. A highlight covers
    /// the grouping too.
    fn expr(&self, id: ExprId, parens: bool) -> String {
        let inner = self.format_expr(id);
        let inner = if parens {
            format!("\\left({inner}\\right)")
        } else {
            inner
        };
        match self.color(id) {
            Some(color) => color.wrap(&inner),
            None => inner,
        }
    }

    fn format_expr(&self, id: ExprId) -> String {
        match self.context.get(id) {
            Expr::Number(n) => render_number(n),
            Expr::Constant(c) => render_constant(*c).to_string(),
            Expr::Symbol(Symbol::Greek(letter)) => letter.latex.to_string(),
            Expr::Symbol(sym @ Symbol::Free(_)) => {
                render_symbol_name(self.context.symbol_name(sym))
            }
            Expr::Add(l, r) => self.format_add(*l, *r),
            Expr::Sub(l, r) => {
                let right = self.expr(*r, self.needs_group_after_minus(*r));
                format!("{} - {}", self.expr(*l, false), right)
            }
            Expr::Mul(l, r) => self.format_mul(*l, *r),
            Expr::Div(l, r) => {
                format!("\\frac{{{}}}{{{}}}", self.expr(*l, false), self.expr(*r, false))
            }
            Expr::Pow(base, exp) => self.format_pow(*base, *exp),
            Expr::Neg(inner) => self.format_neg(*inner),
            Expr::Function(f, args) => self.format_function(*f, args),
            Expr::Integral { body, limits } => self.format_integral(*body, limits),
            Expr::Derivative { body, wrt } => self.format_derivative(*body, wrt),
            Expr::Sum {
                body,
                var,
                lower,
                upper,
            } => format!(
                "\\sum_{{{}={}}}^{{{}}} {}",
                self.expr(*var, false),
                self.expr(*lower, false),
                self.expr(*upper, false),
                self.expr(*body, self.is_sum_like(*body))
            ),
            Expr::Limit {
                body,
                var,
                point,
                direction,
            } => {
                let side = match direction {
                    LimitDirection::Both => "",
                    LimitDirection::Plus => "^+",
                    LimitDirection::Minus => "^-",
                };
                format!(
                    "\\lim_{{{} \\to {}{}}} {}",
                    self.expr(*var, false),
                    self.expr(*point, false),
                    side,
                    self.expr(*body, self.is_sum_like(*body))
                )
            }
        }
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    fn format_add(&self, l: ExprId, r: ExprId) -> String {
        let left = self.expr(l, false);
        // `a + (-b)` reads as `a - b` unless the negation itself is colored.
        if let (Expr::Neg(inner), None) = (self.context.get(r), self.color(r)) {
            return format!(
                "{} - {}",
                left,
                self.expr(*inner, self.needs_group_after_minus(*inner))
            );
        }
        format!("{} + {}", left, self.expr(r, false))
    }

    /// Operands following a binary minus: sums and negations are grouped,
    /// so `a - (-b)` never prints as `a - - b`.
    fn needs_group_after_minus(&self, id: ExprId) -> bool {
        self.is_sum_like(id) || matches!(self.context.get(id), Expr::Neg(_))
    }

    fn format_mul(&self, l: ExprId, r: ExprId) -> String {
        let left_parens = self.is_sum_like(l) || self.is_construct(l);
        let right_parens = self.is_sum_like(r) || matches!(self.context.get(r), Expr::Neg(_));
        let left = self.expr(l, left_parens);
        let right = self.expr(r, right_parens);

        if !right_parens && self.starts_with_number(r) {
            format!("{left} \\cdot {right}")
        } else {
            format!("{left} {right}")
        }
    }

    fn format_pow(&self, base: ExprId, exp: ExprId) -> String {
        let exp_str = self.expr(exp, false);

        // sin(x)^2 → \sin^{2}{\left(x \right)}
        if self.color(base).is_none() {
            if let Expr::Function(f, args) = self.context.get(base) {
                if let (Some(op), [arg]) = (f.latex(), args.as_slice()) {
                    return format!(
                        "{op}^{{{exp_str}}}{{\\left({} \\right)}}",
                        self.expr(*arg, false)
                    );
                }
            }
        }

        let base_str = self.expr(base, !self.is_atomic_base(base));
        format!("{base_str}^{{{exp_str}}}")
    }

    fn format_neg(&self, inner: ExprId) -> String {
        match self.context.get(inner) {
            Expr::Number(_) if self.color(inner).is_none() => {
                format!("-{}", self.expr(inner, false))
            }
            Expr::Add(..) | Expr::Sub(..) | Expr::Neg(_) => {
                format!("-{}", self.expr(inner, true))
            }
            _ => format!("- {}", self.expr(inner, false)),
        }
    }

    fn format_function(&self, f: BuiltinFn, args: &[ExprId]) -> String {
        match (f, args) {
            (BuiltinFn::Sqrt, [arg]) => format!("\\sqrt{{{}}}", self.expr(*arg, false)),
            (BuiltinFn::Exp, [arg]) => format!("e^{{{}}}", self.expr(*arg, false)),
            (BuiltinFn::Abs, [arg]) => format!("\\left|{{{}}}\\right|", self.expr(*arg, false)),
            (BuiltinFn::Log, [arg, base]) => format!(
                "\\log_{{{}}}{{\\left({} \\right)}}",
                self.expr(*base, false),
                self.expr(*arg, false)
            ),
            _ => {
                let op = f
                    .latex()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("\\operatorname{{{}}}", f.name()));
                let rendered: Vec<String> = args.iter().map(|a| self.expr(*a, false)).collect();
                format!("{op}{{\\left({} \\right)}}", rendered.join(", "))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Calculus constructs
    // ------------------------------------------------------------------------

    /// `\int\limits_{a}^{b} f\, dx`; several limits nest with the first
    /// variable innermost.
    fn format_integral(&self, body: ExprId, limits: &[IntegrationLimit]) -> String {
        let mut out = String::new();

        for limit in limits.iter().rev() {
            match limit.bounds {
                Some((lo, hi)) => out.push_str(&format!(
                    "\\int\\limits_{{{}}}^{{{}}}",
                    self.expr(lo, false),
                    self.expr(hi, false)
                )),
                None => out.push_str("\\int"),
            }
        }

        out.push(' ');
        out.push_str(&self.expr(body, self.is_sum_like(body)));

        for limit in limits {
            out.push_str(&format!("\\, d{}", self.expr(limit.var, false)));
        }
        out
    }

    /// `\frac{d}{d x} f`, or `\partial` when more than one variable is
    /// involved. Variables appear in the denominator last-first.
    fn format_derivative(&self, body: ExprId, wrt: &[(ExprId, u32)]) -> String {
        let variables: BTreeSet<String> =
            wrt.iter().map(|(v, _)| self.expr(*v, false)).collect();
        let partial =
            variables.len() > 1 || collect_symbol_names(self.context, body).len() > 1;

        let total: u32 = wrt.iter().map(|(_, n)| n).sum();
        let d = if partial { "\\partial" } else { "d" };
        let numerator = if total == 1 {
            d.to_string()
        } else {
            format!("{d}^{{{total}}}")
        };

        let denominator: Vec<String> = wrt
            .iter()
            .rev()
            .map(|(var, order)| {
                let var = self.expr(*var, false);
                if *order == 1 {
                    format!("{d} {var}")
                } else {
                    format!("{d} {var}^{{{order}}}")
                }
            })
            .collect();
        let separator = if partial { "" } else { " " };

        let body_parens = self.is_sum_like(body) || matches!(self.context.get(body), Expr::Mul(..));
        format!(
            "\\frac{{{numerator}}}{{{}}} {}",
            denominator.join(separator),
            self.expr(body, body_parens)
        )
    }

    // ------------------------------------------------------------------------
    // Grouping predicates
    // ------------------------------------------------------------------------

    fn is_sum_like(&self, id: ExprId) -> bool {
        matches!(self.context.get(id), Expr::Add(..) | Expr::Sub(..))
    }

    fn is_construct(&self, id: ExprId) -> bool {
        matches!(
            self.context.get(id),
            Expr::Integral { .. } | Expr::Derivative { .. } | Expr::Sum { .. } | Expr::Limit { .. }
        )
    }

    /// Bases that can take a superscript without grouping.
    fn is_atomic_base(&self, id: ExprId) -> bool {
        match self.context.get(id) {
            Expr::Number(n) => n.is_integer() && !n.is_negative(),
            Expr::Constant(_) | Expr::Symbol(_) => true,
            Expr::Function(BuiltinFn::Abs, _) => true,
            _ => false,
        }
    }

    /// Whether the rendering of `id` begins with a digit, so a preceding
    /// factor needs an explicit `\cdot`.
    fn starts_with_number(&self, id: ExprId) -> bool {
        if self.color(id).is_some() {
            return false;
        }
        match self.context.get(id) {
            Expr::Number(_) => true,
            Expr::Mul(l, _) => !self.is_sum_like(*l) && self.starts_with_number(*l),
            Expr::Pow(base, _) => self.is_atomic_base(*base) && self.starts_with_number(*base),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rational(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_render_number() {
        assert_eq!(render_number(&rational(7, 1)), "7");
        assert_eq!(render_number(&rational(1, 2)), "0.5");
        assert_eq!(render_number(&rational(314, 100)), "3.14");
        assert_eq!(render_number(&rational(1, 40)), "0.025");
        assert_eq!(render_number(&rational(1, 3)), "\\frac{1}{3}");
        assert_eq!(render_number(&rational(-2, 3)), "-\\frac{2}{3}");
    }

    #[test]
    fn test_render_symbol_name() {
        assert_eq!(render_symbol_name("x"), "x");
        assert_eq!(render_symbol_name("x_1"), "x_{1}");
        assert_eq!(render_symbol_name("alpha_k"), "\\alpha_{k}");
        assert_eq!(render_symbol_name("v_alpha"), "v_{\\alpha}");
        assert_eq!(render_symbol_name("x12"), "x_{12}");
        assert_eq!(render_symbol_name("speed"), "speed");
    }

    #[test]
    fn test_render_keeps_operand_order() {
        let mut ctx = Context::new();
        let b = ctx.free_symbol("b");
        let a = ctx.free_symbol("a");
        let sum = ctx.add(Expr::Add(b, a));
        assert_eq!(LatexRenderer::new(&ctx).expr_to_latex(sum), "b + a");
    }

    #[test]
    fn test_add_of_negation_reads_as_subtraction() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let y = ctx.free_symbol("y");
        let neg = ctx.add(Expr::Neg(y));
        let sum = ctx.add(Expr::Add(x, neg));
        assert_eq!(LatexRenderer::new(&ctx).expr_to_latex(sum), "x - y");
    }

    #[test]
    fn test_negation_after_minus_is_grouped() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let y = ctx.free_symbol("y");
        let neg = ctx.add(Expr::Neg(y));
        let diff = ctx.add(Expr::Sub(x, neg));
        let double_neg = ctx.add(Expr::Neg(neg));
        let sum = ctx.add(Expr::Add(x, double_neg));
        let r = LatexRenderer::new(&ctx);
        assert_eq!(r.expr_to_latex(diff), "x - \\left(- y\\right)");
        assert_eq!(r.expr_to_latex(sum), "x - \\left(- y\\right)");
    }

    #[test]
    fn test_product_grouping_and_cdot() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let two = ctx.num(2);
        let left = ctx.add(Expr::Add(x, two));
        let three = ctx.num(3);
        let product = ctx.add(Expr::Mul(left, three));
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(product),
            "\\left(x + 2\\right) \\cdot 3"
        );

        let two_x = ctx.add(Expr::Mul(two, x));
        assert_eq!(LatexRenderer::new(&ctx).expr_to_latex(two_x), "2 x");
    }

    #[test]
    fn test_power_grouping() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let one = ctx.num(1);
        let two = ctx.num(2);
        let sum = ctx.add(Expr::Add(x, one));
        let pow = ctx.add(Expr::Pow(sum, two));
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(pow),
            "\\left(x + 1\\right)^{2}"
        );

        let sin = ctx.add(Expr::Function(BuiltinFn::Sin, vec![x]));
        let sin_sq = ctx.add(Expr::Pow(sin, two));
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(sin_sq),
            "\\sin^{2}{\\left(x \\right)}"
        );
    }

    #[test]
    fn test_functions() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let two = ctx.num(2);

        let cases = [
            (BuiltinFn::Sqrt, vec![x], "\\sqrt{x}"),
            (BuiltinFn::Exp, vec![x], "e^{x}"),
            (BuiltinFn::Abs, vec![x], "\\left|{x}\\right|"),
            (BuiltinFn::Cos, vec![x], "\\cos{\\left(x \\right)}"),
            (BuiltinFn::Log, vec![x, two], "\\log_{2}{\\left(x \\right)}"),
            (
                BuiltinFn::Atan,
                vec![x],
                "\\operatorname{atan}{\\left(x \\right)}",
            ),
        ];
        for (f, args, expected) in cases {
            let id = ctx.add(Expr::Function(f, args));
            assert_eq!(LatexRenderer::new(&ctx).expr_to_latex(id), expected);
        }
    }

    #[test]
    fn test_highlight_wraps_grouping() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let two = ctx.num(2);
        let left = ctx.add(Expr::Add(x, two));
        let y = ctx.free_symbol("y");
        let product = ctx.add(Expr::Mul(left, y));

        let mut config = HighlightConfig::new();
        config.add(left, Color::parse("red").unwrap());
        let latex = LatexRenderer::new(&ctx)
            .with_highlights(&config)
            .expr_to_latex(product);
        assert_eq!(latex, "{\\color{red}{\\left(x + 2\\right)}} y");
    }

    #[test]
    fn test_integral_forms() {
        let mut ctx = Context::new();
        let one = ctx.num(1);
        let x = ctx.free_symbol("x");
        let indefinite = ctx.add(Expr::Integral {
            body: one,
            limits: vec![IntegrationLimit {
                var: x,
                bounds: None,
            }],
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(indefinite),
            "\\int 1\\, dx"
        );

        let zero = ctx.num(0);
        let y = ctx.free_symbol("y");
        let two = ctx.num(2);
        let definite = ctx.add(Expr::Integral {
            body: x,
            limits: vec![
                IntegrationLimit {
                    var: x,
                    bounds: Some((zero, one)),
                },
                IntegrationLimit {
                    var: y,
                    bounds: Some((zero, two)),
                },
            ],
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(definite),
            "\\int\\limits_{0}^{2}\\int\\limits_{0}^{1} x\\, dx\\, dy"
        );
    }

    #[test]
    fn test_derivative_forms() {
        let mut ctx = Context::new();
        let y = ctx.free_symbol("y");
        let x = ctx.free_symbol("x");
        let first = ctx.add(Expr::Derivative {
            body: y,
            wrt: vec![(x, 1)],
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(first),
            "\\frac{d}{d x} y"
        );

        let second = ctx.add(Expr::Derivative {
            body: y,
            wrt: vec![(x, 2)],
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(second),
            "\\frac{d^{2}}{d x^{2}} y"
        );

        let t = ctx.free_symbol("t");
        let mixed = ctx.add(Expr::Derivative {
            body: y,
            wrt: vec![(x, 1), (t, 1)],
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(mixed),
            "\\frac{\\partial^{2}}{\\partial t\\partial x} y"
        );
    }

    #[test]
    fn test_sum_and_limit() {
        let mut ctx = Context::new();
        let n = ctx.free_symbol("n");
        let zero = ctx.num(0);
        let oo = ctx.add(Expr::Constant(Constant::Infinity));
        let sum = ctx.add(Expr::Sum {
            body: n,
            var: n,
            lower: zero,
            upper: oo,
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(sum),
            "\\sum_{n=0}^{\\infty} n"
        );

        let x = ctx.free_symbol("x");
        let limit = ctx.add(Expr::Limit {
            body: x,
            var: x,
            point: zero,
            direction: LimitDirection::Plus,
        });
        assert_eq!(
            LatexRenderer::new(&ctx).expr_to_latex(limit),
            "\\lim_{x \\to 0^+} x"
        );
    }

    #[test]
    fn test_negation() {
        let mut ctx = Context::new();
        let x = ctx.free_symbol("x");
        let two = ctx.num(2);
        let neg_x = ctx.add(Expr::Neg(x));
        let neg_two = ctx.add(Expr::Neg(two));
        let sum = ctx.add(Expr::Add(x, two));
        let neg_sum = ctx.add(Expr::Neg(sum));
        let r = LatexRenderer::new(&ctx);
        assert_eq!(r.expr_to_latex(neg_x), "- x");
        assert_eq!(r.expr_to_latex(neg_two), "-2");
        assert_eq!(r.expr_to_latex(neg_sum), "-\\left(x + 2\\right)");
    }
}
