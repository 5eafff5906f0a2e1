/// Binary operator kinds
///
/// `Unknown` is the fallback of the symbol tables and never appears in a tree
/// produced by the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BinaryOperator {
    #[default]
    Unknown,
    Add,
    Subtract,
    Multiply,
    Divide,
    EqualTo,
    NotEqualTo,
}

impl BinaryOperator {
    /// Source text of the operator, `None` for `Unknown`.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            BinaryOperator::Unknown => None,
            BinaryOperator::Add => Some("+"),
            BinaryOperator::Subtract => Some("-"),
            BinaryOperator::Multiply => Some("*"),
            BinaryOperator::Divide => Some("/"),
            BinaryOperator::EqualTo => Some("="),
            BinaryOperator::NotEqualTo => Some("<>"),
        }
    }

    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "=" => BinaryOperator::EqualTo,
            "<>" => BinaryOperator::NotEqualTo,
            _ => BinaryOperator::Unknown,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOperator::EqualTo | BinaryOperator::NotEqualTo)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary(BinaryExpression),
    NumberLiteral(NumberLiteralExpression),
    Identifier(IdentifierExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteralExpression {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpression {
    pub name: String,
}

/// Operations over an [`Expression`] tree, one method per variant.
pub trait Visitor {
    type Output;

    fn visit_binary(&mut self, binary: &BinaryExpression) -> Self::Output;
    fn visit_number_literal(&mut self, number: &NumberLiteralExpression) -> Self::Output;
    fn visit_identifier(&mut self, identifier: &IdentifierExpression) -> Self::Output;
}

impl Expression {
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn number(value: f64) -> Self {
        Expression::NumberLiteral(NumberLiteralExpression { value })
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(IdentifierExpression { name: name.into() })
    }

    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expression::Binary(binary) => visitor.visit_binary(binary),
            Expression::NumberLiteral(number) => visitor.visit_number_literal(number),
            Expression::Identifier(identifier) => visitor.visit_identifier(identifier),
        }
    }
}
