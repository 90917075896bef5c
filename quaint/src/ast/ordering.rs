use crate::ast::{Column, Expression};

/// An expression with an optional direction in an `ORDER BY` clause.
pub type OrderDefinition<'a> = (Expression<'a>, Option<Order>);

/// The `ORDER BY` clause of a select, in priority order.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Ordering<'a>(pub Vec<OrderDefinition<'a>>);

impl<'a> Ordering<'a> {
    pub(crate) fn append(mut self, value: OrderDefinition<'a>) -> Self {
        self.0.push(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Order {
    Asc,
    Desc,
}

/// Something a select can be sorted by.
pub trait Orderable<'a>
where
    Self: Sized,
{
    fn order(self, order: Option<Order>) -> OrderDefinition<'a>;

    fn ascend(self) -> OrderDefinition<'a> {
        self.order(Some(Order::Asc))
    }

    fn descend(self) -> OrderDefinition<'a> {
        self.order(Some(Order::Desc))
    }
}

/// Anything `Select::order_by` accepts: a bare column sorts in the database default direction.
pub trait IntoOrderDefinition<'a> {
    fn into_order_definition(self) -> OrderDefinition<'a>;
}

impl<'a> IntoOrderDefinition<'a> for &'a str {
    fn into_order_definition(self) -> OrderDefinition<'a> {
        (Column::from(self).into(), None)
    }
}

impl<'a> IntoOrderDefinition<'a> for Column<'a> {
    fn into_order_definition(self) -> OrderDefinition<'a> {
        (self.into(), None)
    }
}

impl<'a> IntoOrderDefinition<'a> for OrderDefinition<'a> {
    fn into_order_definition(self) -> OrderDefinition<'a> {
        self
    }
}

impl<'a> Orderable<'a> for Column<'a> {
    fn order(self, order: Option<Order>) -> OrderDefinition<'a> {
        (self.into(), order)
    }
}

impl<'a> Orderable<'a> for &'a str {
    fn order(self, order: Option<Order>) -> OrderDefinition<'a> {
        Column::from(self).order(order)
    }
}
