use formtex_ast::{
    BuiltinFn, Construct, Context, Equation, Expr, ExprId, IntegrationLimit, LimitDirection,
    Reserved, Resolved, Statement, Symbol, SymbolTable,
};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{map, peek},
    multi::{fold_many0, many1, separated_list1},
    sequence::{pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use tracing::debug;

use crate::error::ParseError;
use crate::normalize::NormalizedText;

/// Tree depth accepted by [`build`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Intermediate AST for parsing. Names stay unresolved until lowering.
#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Name(String),
    Call(String, Vec<ParseArg>),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
}

/// One call argument. Tuples and directions only mean something to the
/// calculus constructs.
#[derive(Debug, Clone)]
enum ParseArg {
    Expr(ParseNode),
    Tuple(Vec<ParseNode>),
    Direction(LimitDirection),
}

/// Convert a decimal string to BigRational.
/// Supports: "8.2" → 41/5, ".5" → 1/2, "8." → 8, "123" → 123
fn decimal_to_rational(integer_part: &str, fractional_part: &str) -> BigRational {
    let parse = |digits: &str| -> BigInt {
        if digits.is_empty() {
            BigInt::from(0)
        } else {
            digits.parse().unwrap_or_else(|_| BigInt::from(0))
        }
    };

    let denominator = BigInt::from(10).pow(fractional_part.len() as u32);
    let numerator = parse(integer_part) * &denominator + parse(fractional_part);
    BigRational::new(numerator, denominator)
}

fn sym<'a>(t: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(t))
}

fn fail<T>(input: &str, kind: nom::error::ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(input, kind)))
}

// Numeric literals: 123, 8.2, .5, 8.
fn parse_number(input: &str) -> IResult<&str, ParseNode> {
    let int_len = input.bytes().take_while(u8::is_ascii_digit).count();
    let (int_part, rest) = input.split_at(int_len);

    let (frac_part, rest) = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            after_dot.split_at(frac_len)
        }
        None => ("", rest),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return fail(input, nom::error::ErrorKind::Digit);
    }

    Ok((rest, ParseNode::Number(decimal_to_rational(int_part, frac_part))))
}

// Identifiers: a letter, then letters or digits, then an optional `_` and an
// alphanumeric subscript. Examples: x, x1, theta, x_1, P_wf
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    if !input.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return fail(input, nom::error::ErrorKind::Alpha);
    }

    let mut len = input.bytes().take_while(u8::is_ascii_alphanumeric).count();
    if input[len..].starts_with('_') {
        let sub_len = input[len + 1..]
            .bytes()
            .take_while(u8::is_ascii_alphanumeric)
            .count();
        if sub_len > 0 {
            len += 1 + sub_len;
        }
    }

    Ok((&input[len..], &input[..len]))
}

fn parse_name(input: &str) -> IResult<&str, ParseNode> {
    map(parse_identifier, |s: &str| ParseNode::Name(s.to_string()))(input)
}

// Limit direction: '+' or '-' in either quote style
fn parse_direction(input: &str) -> IResult<&str, LimitDirection> {
    let (input, _) = multispace0(input)?;
    let (input, quote) = alt((tag("'"), tag("\"")))(input)?;
    let (input, sign) = alt((tag("+"), tag("-")))(input)?;
    let (input, _) = tag(quote)(input)?;
    let direction = if sign == "+" {
        LimitDirection::Plus
    } else {
        LimitDirection::Minus
    };
    Ok((input, direction))
}

// Tuple argument: (a, b, ...) with at least two members, closing the
// argument it appears in
fn parse_tuple(input: &str) -> IResult<&str, Vec<ParseNode>> {
    let (input, _) = sym("(")(input)?;
    let (input, first) = parse_expr(input)?;
    let (input, rest) = many1(preceded(sym(","), parse_expr))(input)?;
    let (input, _) = sym(")")(input)?;
    let (input, _) = peek(alt((sym(","), sym(")"))))(input)?;

    let mut members = vec![first];
    members.extend(rest);
    Ok((input, members))
}

fn parse_arg(input: &str) -> IResult<&str, ParseArg> {
    alt((
        map(parse_direction, ParseArg::Direction),
        map(parse_tuple, ParseArg::Tuple),
        map(parse_expr, ParseArg::Expr),
    ))(input)
}

// Calls: name(arg, ...)
fn parse_call(input: &str) -> IResult<&str, ParseNode> {
    let (input, name) = parse_identifier(input)?;
    let (input, _) = sym("(")(input)?;
    let (input, args) = separated_list1(sym(","), parse_arg)(input)?;
    let (input, _) = sym(")")(input)?;
    Ok((input, ParseNode::Call(name.to_string(), args)))
}

fn parse_parens(input: &str) -> IResult<&str, ParseNode> {
    let (input, _) = sym("(")(input)?;
    let (input, inner) = parse_expr(input)?;
    let (input, _) = sym(")")(input)?;
    Ok((input, inner))
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((parse_number, parse_call, parse_name, parse_parens)),
    )(input)
}

/// Consume a run of sign prefixes and count how many were `-`.
fn sign_run(mut input: &str) -> (&str, usize) {
    let mut negations = 0;
    loop {
        let sign: IResult<&str, &str> = alt((sym("-"), sym("+")))(input);
        let Ok((rest, op)) = sign else {
            return (input, negations);
        };
        if op == "-" {
            negations += 1;
        }
        input = rest;
    }
}

fn negate(mut node: ParseNode, negations: usize) -> ParseNode {
    for _ in 0..negations {
        node = ParseNode::Neg(Box::new(node));
    }
    node
}

// Power - right associative: 2**3**4 = 2**(3**4). Exponents take a sign
// prefix: x**-2, x**-(a+b). The chain is collected in a loop and folded
// from the right.
fn parse_power(input: &str) -> IResult<&str, ParseNode> {
    let (mut input, base) = parse_atom(input)?;

    let mut exponents: Vec<(usize, ParseNode)> = Vec::new();
    loop {
        let caret: IResult<&str, &str> = sym("**")(input);
        let Ok((rest, _)) = caret else { break };
        let (rest, negations) = sign_run(rest);
        let (rest, atom) = parse_atom(rest)?;
        exponents.push((negations, atom));
        input = rest;
    }

    let mut tail: Option<ParseNode> = None;
    for (negations, atom) in exponents.into_iter().rev() {
        let node = match tail {
            Some(exp) => ParseNode::Pow(Box::new(atom), Box::new(exp)),
            None => atom,
        };
        tail = Some(negate(node, negations));
    }

    let node = match tail {
        Some(exp) => ParseNode::Pow(Box::new(base), Box::new(exp)),
        None => base,
    };
    Ok((input, node))
}

fn parse_unary(input: &str) -> IResult<&str, ParseNode> {
    let (input, negations) = sign_run(input);
    let (input, node) = parse_power(input)?;
    Ok((input, negate(node, negations)))
}

/// Next token could start an implicitly multiplied factor: 2x, 3(x+y), x y
fn starts_factor(input: &str) -> bool {
    input
        .trim_start()
        .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '(' || c == '.')
}

// Term: explicit `*` and `/`, plus implicit multiplication by adjacency
fn parse_term(input: &str) -> IResult<&str, ParseNode> {
    let (mut input, mut acc) = parse_unary(input)?;

    loop {
        let explicit: IResult<&str, &str> = alt((sym("*"), sym("/")))(input);
        if let Ok((rest, op)) = explicit {
            let (rest, rhs) = parse_unary(rest)?;
            acc = match op {
                "*" => ParseNode::Mul(Box::new(acc), Box::new(rhs)),
                _ => ParseNode::Div(Box::new(acc), Box::new(rhs)),
            };
            input = rest;
            continue;
        }

        if starts_factor(input) {
            if let Ok((rest, rhs)) = parse_power(input) {
                acc = ParseNode::Mul(Box::new(acc), Box::new(rhs));
                input = rest;
                continue;
            }
        }

        return Ok((input, acc));
    }
}

fn parse_expr(input: &str) -> IResult<&str, ParseNode> {
    let (input, init) = parse_term(input)?;
    fold_many0(
        pair(alt((sym("+"), sym("-"))), parse_term),
        move || init.clone(),
        |acc, (op, val)| match op {
            "+" => ParseNode::Add(Box::new(acc), Box::new(val)),
            _ => ParseNode::Sub(Box::new(acc), Box::new(val)),
        },
    )(input)
}

fn syntax_error(err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let near: String = e.input.chars().take(16).collect();
            if near.is_empty() {
                ParseError::Syntax("unexpected end of formula".to_string())
            } else {
                ParseError::Syntax(format!("unexpected input near '{near}'"))
            }
        }
        nom::Err::Incomplete(_) => ParseError::Syntax("incomplete formula".to_string()),
    }
}

/// Parse one side of a formula into a `ParseNode`.
fn parse_side(text: &str) -> Result<ParseNode, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let (remaining, node) = parse_expr(text).map_err(syntax_error)?;
    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }
    Ok(node)
}

/// Lowers `ParseNode`s into a context, resolving names and bounding depth.
struct Lowering<'c> {
    ctx: &'c mut Context,
    max_depth: usize,
}

impl Lowering<'_> {
    fn lower(&mut self, node: ParseNode, depth: usize) -> Result<ExprId, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
            });
        }

        let expr = match node {
            ParseNode::Number(n) => Expr::Number(n),
            ParseNode::Name(name) => self.name_leaf(&name)?,
            chain @ (ParseNode::Add(..)
            | ParseNode::Sub(..)
            | ParseNode::Mul(..)
            | ParseNode::Div(..)) => return self.lower_chain(chain, depth),
            ParseNode::Pow(b, e) => {
                let b = self.lower(*b, depth + 1)?;
                let e = self.lower(*e, depth + 1)?;
                Expr::Pow(b, e)
            }
            ParseNode::Neg(e) => Expr::Neg(self.lower(*e, depth + 1)?),
            ParseNode::Call(name, args) => return self.lower_call(name, args, depth),
        };

        Ok(self.ctx.add(expr))
    }

    /// Lower a left-nested `+`/`-` or `*`/`/` chain along its spine.
    ///
    /// Every operand sits one level below the chain, however many links it
    /// has, so `a+b+...+z` is as deep as `a+b`.
    fn lower_chain(&mut self, node: ParseNode, depth: usize) -> Result<ExprId, ParseError> {
        let additive = matches!(node, ParseNode::Add(..) | ParseNode::Sub(..));
        let mut links: Vec<(fn(ExprId, ExprId) -> Expr, ParseNode)> = Vec::new();

        let mut head = node;
        let head = loop {
            head = match head {
                ParseNode::Add(l, r) if additive => {
                    links.push((Expr::Add, *r));
                    *l
                }
                ParseNode::Sub(l, r) if additive => {
                    links.push((Expr::Sub, *r));
                    *l
                }
                ParseNode::Mul(l, r) if !additive => {
                    links.push((Expr::Mul, *r));
                    *l
                }
                ParseNode::Div(l, r) if !additive => {
                    links.push((Expr::Div, *r));
                    *l
                }
                other => break other,
            };
        };

        let mut acc = self.lower(head, depth + 1)?;
        for (op, rhs) in links.into_iter().rev() {
            let rhs = self.lower(rhs, depth + 1)?;
            acc = self.ctx.add(op(acc, rhs));
        }
        Ok(acc)
    }

    /// Leaf for a bare name. Functions and constructs must be called.
    fn name_leaf(&self, name: &str) -> Result<Expr, ParseError> {
        match self.ctx.symbols().resolve(name) {
            Some(Resolved::Free(id)) => Ok(Expr::Symbol(Symbol::Free(id))),
            Some(Resolved::Reserved(Reserved::Constant(c))) => Ok(Expr::Constant(c)),
            Some(Resolved::Reserved(Reserved::GreekLetter(g))) => Ok(Expr::Symbol(Symbol::Greek(g))),
            Some(Resolved::Reserved(Reserved::Function(_) | Reserved::Construct(_))) => {
                Err(ParseError::BareFunction(name.to_string()))
            }
            None if name == "ln" => Err(ParseError::BareFunction(name.to_string())),
            None => Err(ParseError::UndeclaredName(name.to_string())),
        }
    }

    fn lower_call(
        &mut self,
        name: String,
        args: Vec<ParseArg>,
        depth: usize,
    ) -> Result<ExprId, ParseError> {
        if name == "ln" {
            return self.lower_function(BuiltinFn::Log, "ln", args, depth);
        }

        match self.ctx.symbols().resolve(&name) {
            Some(Resolved::Reserved(Reserved::Function(f))) => {
                self.lower_function(f, &name, args, depth)
            }
            Some(Resolved::Reserved(Reserved::Construct(c))) => self.lower_construct(c, args, depth),
            Some(_) => {
                // A symbol or constant "applied" to one argument is a product.
                let mut args = args;
                match (args.pop(), args.is_empty()) {
                    (Some(ParseArg::Expr(arg)), true) => {
                        let head = self.name_leaf(&name)?;
                        let head = self.ctx.add(head);
                        let arg = self.lower(arg, depth + 1)?;
                        Ok(self.ctx.add(Expr::Mul(head, arg)))
                    }
                    _ => Err(ParseError::NotCallable(name)),
                }
            }
            None => Err(ParseError::UndeclaredName(name)),
        }
    }

    fn lower_function(
        &mut self,
        f: BuiltinFn,
        name: &str,
        args: Vec<ParseArg>,
        depth: usize,
    ) -> Result<ExprId, ParseError> {
        let (min, max) = f.arity();
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(ParseError::Arity {
                name: name.to_string(),
                expected,
                found: args.len(),
            });
        }

        let mut ids = Vec::with_capacity(args.len());
        for arg in args {
            let ParseArg::Expr(node) = arg else {
                return Err(invalid(name, "expected an expression"));
            };
            ids.push(self.lower(node, depth + 1)?);
        }
        Ok(self.ctx.add(Expr::Function(f, ids)))
    }

    fn lower_construct(
        &mut self,
        construct: Construct,
        args: Vec<ParseArg>,
        depth: usize,
    ) -> Result<ExprId, ParseError> {
        let name = construct.name();
        let mut args = args.into_iter();
        let body = match args.next() {
            Some(ParseArg::Expr(node)) => self.lower(node, depth + 1)?,
            Some(_) => return Err(invalid(name, "the first argument must be an expression")),
            None => return Err(arity(name, "at least 2", 0)),
        };
        let rest: Vec<ParseArg> = args.collect();

        let expr = match construct {
            Construct::Integral => self.integral(body, rest, depth)?,
            Construct::Derivative => self.derivative(body, rest, depth)?,
            Construct::Sum => self.sum(body, rest, depth)?,
            Construct::Limit => self.limit(body, rest, depth)?,
        };
        Ok(self.ctx.add(expr))
    }

    /// A variable argument: a free symbol or Greek letter name.
    fn variable(&mut self, node: ParseNode, construct: &str) -> Result<ExprId, ParseError> {
        let ParseNode::Name(name) = node else {
            return Err(invalid(construct, "expected a variable"));
        };
        match self.name_leaf(&name)? {
            leaf @ Expr::Symbol(_) => Ok(self.ctx.add(leaf)),
            _ => Err(invalid(construct, &format!("'{name}' is not a variable"))),
        }
    }

    fn integral(
        &mut self,
        body: ExprId,
        rest: Vec<ParseArg>,
        depth: usize,
    ) -> Result<Expr, ParseError> {
        const NAME: &str = "Integral";
        if rest.is_empty() {
            return Err(arity(NAME, "at least 2", 1));
        }

        let mut limits = Vec::with_capacity(rest.len());
        for arg in rest {
            let limit = match arg {
                ParseArg::Expr(node) => IntegrationLimit {
                    var: self.variable(node, NAME)?,
                    bounds: None,
                },
                ParseArg::Tuple(members) if members.len() == 3 => {
                    let [var, lo, hi]: [ParseNode; 3] = members
                        .try_into()
                        .map_err(|_| invalid(NAME, "expected (variable, lower, upper)"))?;
                    let var = self.variable(var, NAME)?;
                    let lo = self.lower(lo, depth + 1)?;
                    let hi = self.lower(hi, depth + 1)?;
                    IntegrationLimit {
                        var,
                        bounds: Some((lo, hi)),
                    }
                }
                _ => return Err(invalid(NAME, "expected a variable or (variable, lower, upper)")),
            };
            limits.push(limit);
        }

        Ok(Expr::Integral { body, limits })
    }

    fn derivative(
        &mut self,
        body: ExprId,
        rest: Vec<ParseArg>,
        _depth: usize,
    ) -> Result<Expr, ParseError> {
        const NAME: &str = "Derivative";
        if rest.is_empty() {
            return Err(arity(NAME, "at least 2", 1));
        }

        let mut wrt: Vec<(ExprId, u32)> = Vec::new();
        for arg in rest {
            match arg {
                ParseArg::Expr(ParseNode::Number(n)) => {
                    let order = derivative_order(&n)?;
                    match wrt.last_mut() {
                        Some((_, current)) if *current == 1 => *current = order,
                        _ => return Err(invalid(NAME, "an order must follow its variable")),
                    }
                }
                ParseArg::Expr(node) => {
                    let var = self.variable(node, NAME)?;
                    wrt.push((var, 1));
                }
                ParseArg::Tuple(members) if members.len() == 2 => {
                    let [var, order]: [ParseNode; 2] = members
                        .try_into()
                        .map_err(|_| invalid(NAME, "expected (variable, order)"))?;
                    let ParseNode::Number(n) = order else {
                        return Err(invalid(NAME, "the order must be a positive integer"));
                    };
                    let order = derivative_order(&n)?;
                    let var = self.variable(var, NAME)?;
                    wrt.push((var, order));
                }
                _ => return Err(invalid(NAME, "expected a variable or (variable, order)")),
            }
        }

        Ok(Expr::Derivative { body, wrt })
    }

    fn sum(&mut self, body: ExprId, rest: Vec<ParseArg>, depth: usize) -> Result<Expr, ParseError> {
        const NAME: &str = "Sum";
        let found = rest.len() + 1;
        let mut rest = rest.into_iter();
        match (rest.next(), rest.next()) {
            (Some(ParseArg::Tuple(members)), None) if members.len() == 3 => {
                let [var, lower, upper]: [ParseNode; 3] = members
                    .try_into()
                    .map_err(|_| invalid(NAME, "expected (variable, lower, upper)"))?;
                let var = self.variable(var, NAME)?;
                let lower = self.lower(lower, depth + 1)?;
                let upper = self.lower(upper, depth + 1)?;
                Ok(Expr::Sum {
                    body,
                    var,
                    lower,
                    upper,
                })
            }
            (Some(_), None) => Err(invalid(NAME, "expected (variable, lower, upper)")),
            _ => Err(arity(NAME, "2", found)),
        }
    }

    fn limit(&mut self, body: ExprId, rest: Vec<ParseArg>, depth: usize) -> Result<Expr, ParseError> {
        const NAME: &str = "Limit";
        if rest.len() < 2 || rest.len() > 3 {
            return Err(arity(NAME, "3 to 4", rest.len() + 1));
        }

        let mut rest = rest.into_iter();
        let var = match rest.next() {
            Some(ParseArg::Expr(node)) => self.variable(node, NAME)?,
            _ => return Err(invalid(NAME, "expected a variable")),
        };
        let point = match rest.next() {
            Some(ParseArg::Expr(node)) => self.lower(node, depth + 1)?,
            _ => return Err(invalid(NAME, "expected a limit point")),
        };
        let direction = match rest.next() {
            None => LimitDirection::Both,
            Some(ParseArg::Direction(d)) => d,
            Some(_) => return Err(invalid(NAME, "direction must be '+' or '-'")),
        };

        Ok(Expr::Limit {
            body,
            var,
            point,
            direction,
        })
    }
}

fn invalid(name: &str, reason: &str) -> ParseError {
    ParseError::InvalidArgument {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn arity(name: &str, expected: &str, found: usize) -> ParseError {
    ParseError::Arity {
        name: name.to_string(),
        expected: expected.to_string(),
        found,
    }
}

fn derivative_order(n: &BigRational) -> Result<u32, ParseError> {
    if !n.is_integer() {
        return Err(invalid("Derivative", "the order must be a positive integer"));
    }
    match u32::try_from(&n.to_integer()) {
        Ok(order) if order > 0 => Ok(order),
        _ => Err(invalid("Derivative", "the order must be a positive integer")),
    }
}

/// An expression tree together with the context that owns it.
#[derive(Debug, Clone)]
pub struct ParsedFormula {
    pub context: Context,
    pub statement: Statement,
}

/// Build the expression tree of `text`, resolving names through `symbols`.
pub fn build(text: &NormalizedText, symbols: SymbolTable) -> Result<ParsedFormula, ParseError> {
    build_with_limit(text, symbols, DEFAULT_MAX_DEPTH)
}

/// [`build`] with an explicit tree depth bound.
pub fn build_with_limit(
    text: &NormalizedText,
    symbols: SymbolTable,
    max_depth: usize,
) -> Result<ParsedFormula, ParseError> {
    debug!(
        formula = %text,
        symbols = symbols.len(),
        "building expression tree"
    );

    let mut context = Context::with_symbols(symbols);
    let mut lowering = Lowering {
        ctx: &mut context,
        max_depth,
    };

    let statement = match text {
        NormalizedText::Expression(side) => {
            let node = parse_side(side)?;
            Statement::Expression(lowering.lower(node, 0)?)
        }
        NormalizedText::Equation { lhs, rhs } => {
            let lhs = parse_side(lhs)?;
            let rhs = parse_side(rhs)?;
            let lhs = lowering.lower(lhs, 0)?;
            let rhs = lowering.lower(rhs, 0)?;
            Statement::Equation(Equation { lhs, rhs })
        }
    };

    Ok(ParsedFormula { context, statement })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::normalize::normalize;
    use crate::resolve::resolve;
    use formtex_ast::Constant;

    fn parse(text: &str) -> Result<ParsedFormula, ParseError> {
        let normalized = normalize(text, &Dialect::default());
        let symbols = resolve(&normalized);
        build(&normalized, symbols)
    }

    fn root(parsed: &ParsedFormula) -> ExprId {
        match parsed.statement {
            Statement::Expression(id) => id,
            Statement::Equation(_) => panic!("expected an expression"),
        }
    }

    fn rational(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_decimal_literals() {
        let cases = [("8.2", rational(41, 5)), (".5", rational(1, 2)), ("8.", rational(8, 1))];
        for (input, expected) in cases {
            let parsed = parse(input).unwrap();
            assert_eq!(parsed.context.get(root(&parsed)), &Expr::Number(expected));
        }
    }

    #[test]
    fn test_precedence() {
        let parsed = parse("1 + 2*x**3").unwrap();
        let ctx = &parsed.context;
        let Expr::Add(_, r) = ctx.get(root(&parsed)) else {
            panic!("expected Add");
        };
        let Expr::Mul(_, p) = ctx.get(*r) else {
            panic!("expected Mul");
        };
        assert!(matches!(ctx.get(*p), Expr::Pow(..)));
    }

    #[test]
    fn test_power_is_right_associative() {
        let parsed = parse("2^3^4").unwrap();
        let ctx = &parsed.context;
        let Expr::Pow(_, e) = ctx.get(root(&parsed)) else {
            panic!("expected Pow");
        };
        assert!(matches!(ctx.get(*e), Expr::Pow(..)));
    }

    #[test]
    fn test_negative_exponent() {
        let parsed = parse("x^-2").unwrap();
        let ctx = &parsed.context;
        let Expr::Pow(_, e) = ctx.get(root(&parsed)) else {
            panic!("expected Pow");
        };
        assert!(matches!(ctx.get(*e), Expr::Neg(_)));
    }

    #[test]
    fn test_implicit_multiplication() {
        for text in ["2x", "2 x", "3(x+1)", "(a)(b)", "x y"] {
            let parsed = parse(text).unwrap();
            assert!(
                matches!(parsed.context.get(root(&parsed)), Expr::Mul(..)),
                "{text} should be a product"
            );
        }
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let parsed = parse("-x^2").unwrap();
        let ctx = &parsed.context;
        let Expr::Neg(inner) = ctx.get(root(&parsed)) else {
            panic!("expected Neg");
        };
        assert!(matches!(ctx.get(*inner), Expr::Pow(..)));
    }

    #[test]
    fn test_functions_and_constants() {
        let parsed = parse("sin(pi) + log(x, 2)").unwrap();
        let ctx = &parsed.context;
        let Expr::Add(l, r) = ctx.get(root(&parsed)) else {
            panic!("expected Add");
        };
        let Expr::Function(BuiltinFn::Sin, args) = ctx.get(*l) else {
            panic!("expected sin");
        };
        assert_eq!(ctx.get(args[0]), &Expr::Constant(Constant::Pi));
        assert!(matches!(ctx.get(*r), Expr::Function(BuiltinFn::Log, a) if a.len() == 2));
    }

    #[test]
    fn test_ln_is_log() {
        let parsed = parse("ln(x)").unwrap();
        assert!(matches!(
            parsed.context.get(root(&parsed)),
            Expr::Function(BuiltinFn::Log, _)
        ));
    }

    #[test]
    fn test_greek_letter_leaf() {
        let parsed = parse("theta").unwrap();
        assert!(matches!(
            parsed.context.get(root(&parsed)),
            Expr::Symbol(Symbol::Greek(g)) if g.name == "theta"
        ));
    }

    #[test]
    fn test_free_symbol_application_is_product() {
        let parsed = parse("f(x)").unwrap();
        assert!(matches!(parsed.context.get(root(&parsed)), Expr::Mul(..)));
        assert_eq!(parse("f(x, y)").unwrap_err(), ParseError::NotCallable("f".into()));
    }

    #[test]
    fn test_bare_function_rejected() {
        assert_eq!(parse("sqrt").unwrap_err(), ParseError::BareFunction("sqrt".into()));
        assert_eq!(parse("2*Integral").unwrap_err(), ParseError::BareFunction("Integral".into()));
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            parse("sin(x, y)").unwrap_err(),
            ParseError::Arity {
                name: "sin".into(),
                expected: "1".into(),
                found: 2
            }
        );
    }

    #[test]
    fn test_undeclared_name_without_resolver() {
        let normalized = NormalizedText::Expression("x + 1".into());
        assert_eq!(
            build(&normalized, SymbolTable::new()).unwrap_err(),
            ParseError::UndeclaredName("x".into())
        );
    }

    #[test]
    fn test_integral_forms() {
        let parsed = parse("Integral(, x)").unwrap();
        let ctx = &parsed.context;
        let Expr::Integral { body, limits } = ctx.get(root(&parsed)) else {
            panic!("expected Integral");
        };
        assert_eq!(ctx.get(*body), &Expr::Number(rational(1, 1)));
        assert_eq!(limits.len(), 1);
        assert!(limits[0].bounds.is_none());

        let parsed = parse("Integral(x^2, (x, 0, 1))").unwrap();
        let Expr::Integral { limits, .. } = parsed.context.get(root(&parsed)) else {
            panic!("expected Integral");
        };
        assert!(limits[0].bounds.is_some());
    }

    #[test]
    fn test_derivative_orders() {
        for text in ["Derivative(f, x, 2)", "Derivative(f, (x, 2))"] {
            let parsed = parse(text).unwrap();
            let Expr::Derivative { wrt, .. } = parsed.context.get(root(&parsed)) else {
                panic!("expected Derivative");
            };
            assert_eq!(wrt.len(), 1);
            assert_eq!(wrt[0].1, 2, "{text}");
        }

        let parsed = parse("Derivative(f, x, y)").unwrap();
        let Expr::Derivative { wrt, .. } = parsed.context.get(root(&parsed)) else {
            panic!("expected Derivative");
        };
        assert_eq!(wrt.len(), 2);
    }

    #[test]
    fn test_derivative_bad_order() {
        assert!(matches!(
            parse("Derivative(f, x, 0)").unwrap_err(),
            ParseError::InvalidArgument { .. }
        ));
        assert!(matches!(
            parse("Derivative(f, 2)").unwrap_err(),
            ParseError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_sum_and_limit() {
        let parsed = parse("Sum(1/n^2, (n, 1, oo))").unwrap();
        assert!(matches!(parsed.context.get(root(&parsed)), Expr::Sum { .. }));

        let parsed = parse("Limit(sin(x)/x, x, 0, '+')").unwrap();
        assert!(matches!(
            parsed.context.get(root(&parsed)),
            Expr::Limit {
                direction: LimitDirection::Plus,
                ..
            }
        ));

        assert!(matches!(
            parse("Sum(n, n)").unwrap_err(),
            ParseError::InvalidArgument { .. }
        ));
        assert!(matches!(parse("Limit(x, x)").unwrap_err(), ParseError::Arity { .. }));
    }

    #[test]
    fn test_construct_variable_must_be_symbol() {
        assert!(matches!(
            parse("Integral(x, 2)").unwrap_err(),
            ParseError::InvalidArgument { .. }
        ));
        assert!(matches!(
            parse("Integral(x, pi)").unwrap_err(),
            ParseError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_equation_shares_context() {
        let parsed = parse("y = 2x + 1").unwrap();
        let Statement::Equation(eq) = parsed.statement else {
            panic!("expected equation");
        };
        assert_ne!(eq.lhs, eq.rhs);
        assert_eq!(parsed.context.symbols().len(), 2);
    }

    #[test]
    fn test_empty_equation_side() {
        assert_eq!(parse("y = ").unwrap_err(), ParseError::EmptyExpression);
    }

    #[test]
    fn test_unconsumed_and_syntax_errors() {
        assert!(matches!(parse("x )").unwrap_err(), ParseError::UnconsumedInput(_)));
        assert!(matches!(parse("* x").unwrap_err(), ParseError::Syntax(_)));
        assert!(matches!(parse("a == b").unwrap_err(), ParseError::UnconsumedInput(_)));
    }

    #[test]
    fn test_depth_limit() {
        let normalized = normalize("2^2^2^2^2^2", &Dialect::default());
        let err = build_with_limit(&normalized, SymbolTable::new(), 3).unwrap_err();
        assert_eq!(err, ParseError::TooDeep { limit: 3 });
        assert!(err.is_resource_limit());
        assert!(build_with_limit(&normalized, SymbolTable::new(), 8).is_ok());
    }

    #[test]
    fn test_flat_chains_do_not_count_as_depth() {
        let sum = vec!["1"; 300].join("+");
        let normalized = normalize(&sum, &Dialect::default());
        let parsed = build_with_limit(&normalized, SymbolTable::new(), 2).unwrap();
        assert!(matches!(parsed.context.get(root(&parsed)), Expr::Add(..)));

        let product = vec!["2"; 300].join("*");
        let normalized = normalize(&product, &Dialect::default());
        assert!(build_with_limit(&normalized, SymbolTable::new(), 2).is_ok());
    }

    #[test]
    fn test_chain_keeps_left_association() {
        let parsed = parse("a - b + c").unwrap();
        let ctx = &parsed.context;
        let Expr::Add(l, r) = ctx.get(root(&parsed)) else {
            panic!("expected Add");
        };
        assert!(matches!(ctx.get(*l), Expr::Sub(..)));
        assert!(matches!(ctx.get(*r), Expr::Symbol(_)));
    }

    #[test]
    fn test_sign_runs() {
        let parsed = parse("--x").unwrap();
        let ctx = &parsed.context;
        let Expr::Neg(inner) = ctx.get(root(&parsed)) else {
            panic!("expected Neg");
        };
        assert!(matches!(ctx.get(*inner), Expr::Neg(_)));

        let parsed = parse("+-+x").unwrap();
        let Expr::Neg(inner) = parsed.context.get(root(&parsed)) else {
            panic!("expected Neg");
        };
        assert!(matches!(parsed.context.get(*inner), Expr::Symbol(_)));
    }

    #[test]
    fn test_long_sign_run_is_an_error_not_an_overflow() {
        let text = format!("{}x", "-".repeat(990));
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::TooDeep {
                limit: DEFAULT_MAX_DEPTH
            }
        );

        let text = format!("x^{}2", "-".repeat(990));
        assert!(parse(&text).unwrap_err().is_resource_limit());
    }

    #[test]
    fn test_long_power_chain_is_an_error_not_an_overflow() {
        let text = vec!["x"; 330].join("^");
        assert!(parse(&text).unwrap_err().is_resource_limit());
    }
}
