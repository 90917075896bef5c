use quaint::ast::{Column, Comparable, ConditionTree, Expression};
use query_structure::Condition;

/// Translates a column condition. `And`, `Or` and `Not` recurse on the same column.
pub fn build_condition(column: Column<'static>, condition: &Condition) -> ConditionTree<'static> {
    match condition {
        Condition::And(operands) => ConditionTree::And(conjunction(&column, operands)),
        Condition::Or(operands) => ConditionTree::Or(conjunction(&column, operands)),
        Condition::Not(operand) => ConditionTree::not(build_condition(column, operand)),
        Condition::Equals(value) => column.equals(value.clone()).into(),
        Condition::NotEquals(value) => column.not_equals(value.clone()).into(),
        Condition::LessThan(value) => column.less_than(value.clone()).into(),
        Condition::LessThanOrEquals(value) => column.less_than_or_equals(value.clone()).into(),
        Condition::GreaterThan(value) => column.greater_than(value.clone()).into(),
        Condition::GreaterThanOrEquals(value) => column.greater_than_or_equals(value.clone()).into(),
        Condition::In(values) => column.in_selection(values.clone()).into(),
        Condition::NotIn(values) => ConditionTree::not(column.in_selection(values.clone())),
        Condition::IsNull(true) | Condition::Null(true) => column.is_null().into(),
        Condition::IsNull(false) | Condition::Null(false) => ConditionTree::not(column.is_null()),
        Condition::Never => ConditionTree::NegativeCondition,
        Condition::Always => ConditionTree::NoCondition,
    }
}

fn conjunction(column: &Column<'static>, operands: &[Condition]) -> Vec<Expression<'static>> {
    operands
        .iter()
        .map(|operand| build_condition(column.clone(), operand).into())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_value::ContentValue;
    use expect_test::expect;
    use quaint::{
        ast::Select,
        visitor::{Postgres, Visitor},
    };

    fn render(condition: Condition) -> String {
        let query = Select::from_table("post").so_that(build_condition(Column::new("title"), &condition));
        Postgres::build(query).unwrap().0
    }

    #[test]
    fn nested_operators_stay_on_one_column() {
        let condition = Condition::Or(vec![
            Condition::Equals("a".into()),
            Condition::And(vec![Condition::Not(Box::new(Condition::IsNull(true))), Condition::GreaterThan(3.into())]),
        ]);

        expect![[r#"SELECT * FROM "post" WHERE ("title" = $1 OR (NOT ("title" IS NULL) AND "title" > $2))"#]]
            .assert_eq(&render(condition));
    }

    #[test]
    fn both_null_spellings_mean_the_same() {
        assert_eq!(render(Condition::IsNull(false)), render(Condition::Null(false)));
        expect![[r#"SELECT * FROM "post" WHERE NOT ("title" IS NULL)"#]].assert_eq(&render(Condition::Null(false)));
    }

    #[test]
    fn lists_and_constants() {
        let not_in = Condition::NotIn(vec![ContentValue::Int(1), ContentValue::Int(2)]);

        expect![[r#"SELECT * FROM "post" WHERE NOT ("title" IN ($1,$2))"#]].assert_eq(&render(not_in));
        expect![[r#"SELECT * FROM "post" WHERE 1=0"#]].assert_eq(&render(Condition::Never));
        expect![[r#"SELECT * FROM "post" WHERE 1=1"#]].assert_eq(&render(Condition::Always));
        expect![[r#"SELECT * FROM "post" WHERE 1=0"#]].assert_eq(&render(Condition::In(vec![])));
    }
}
