use super::*;

/// Tree structures and leaves for condition building.
#[derive(Debug, PartialEq, Clone, Default)]
pub enum ConditionTree<'a> {
    /// `(left_expression AND right_expression)`
    And(Vec<Expression<'a>>),
    /// `(left_expression OR right_expression)`
    Or(Vec<Expression<'a>>),
    /// `(NOT expression)`
    Not(Box<Expression<'a>>),
    /// A single expression leaf
    Single(Box<Expression<'a>>),
    /// A leaf that does nothing to the condition, `1=1`
    #[default]
    NoCondition,
    /// A leaf that cancels the condition, `1=0`
    NegativeCondition,
}

impl<'a> ConditionTree<'a> {
    /// An `AND` statement, is true when both sides are true.
    pub fn and<E, J>(left: E, right: J) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
        J: Into<Expression<'a>>,
    {
        ConditionTree::And(vec![left.into(), right.into()])
    }

    /// An `OR` statement, is true when one side is true.
    pub fn or<E, J>(left: E, right: J) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
        J: Into<Expression<'a>>,
    {
        ConditionTree::Or(vec![left.into(), right.into()])
    }

    /// A `NOT` statement, is true when the expression is false.
    pub fn not<E>(left: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::Not(Box::new(left.into()))
    }

    /// A single leaf, is true when the expression is true.
    pub fn single<E>(left: E) -> ConditionTree<'a>
    where
        E: Into<Expression<'a>>,
    {
        ConditionTree::Single(Box::new(left.into()))
    }

    /// Inverts the entire condition tree if condition is met.
    pub fn invert_if(self, invert: bool) -> ConditionTree<'a> {
        if invert {
            ConditionTree::not(self)
        } else {
            self
        }
    }

    /// Conjunction with another tree, dropping operands that impose nothing.
    pub fn and_with(self, other: ConditionTree<'a>) -> ConditionTree<'a> {
        match (self, other) {
            (ConditionTree::NoCondition, other) => other,
            (this, ConditionTree::NoCondition) => this,
            (ConditionTree::NegativeCondition, _) | (_, ConditionTree::NegativeCondition) => {
                ConditionTree::NegativeCondition
            }
            (ConditionTree::And(mut left), ConditionTree::And(right)) => {
                left.extend(right);
                ConditionTree::And(left)
            }
            (ConditionTree::And(mut left), right) => {
                left.push(right.into());
                ConditionTree::And(left)
            }
            (left, right) => ConditionTree::and(left, right),
        }
    }
}

impl<'a> From<Compare<'a>> for ConditionTree<'a> {
    fn from(compare: Compare<'a>) -> Self {
        ConditionTree::single(compare)
    }
}

impl<'a> From<Expression<'a>> for ConditionTree<'a> {
    fn from(expr: Expression<'a>) -> Self {
        match expr.kind {
            ExpressionKind::ConditionTree(tree) => tree,
            _ => ConditionTree::Single(Box::new(expr)),
        }
    }
}
