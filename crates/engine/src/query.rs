//! Compiles filter clauses into a single conjunctive query.
//!
//! A [`Query`] is the AND of one predicate per filter, in filter order. The
//! same value drives listing, totals and in-memory evaluation, so the numbers
//! reported next to a page always describe the rows the page was cut from.

use std::{cmp::Ordering, fmt};

use sea_orm::{
    ColumnTrait, Condition, QueryFilter, Value,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};

use crate::{
    EngineError, Entry, ResultEngine, entry,
    filter::{Filter, FilterField, FilterOp, FilterValue},
    util,
};

/// Ordering/equality comparison between a column and an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,
}

impl Comparison {
    fn holds(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return false;
        };
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
        }
    }
}

/// One compiled sub-predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare {
        field: FilterField,
        cmp: Comparison,
        operand: FilterValue,
    },
    /// Literal substring test on the case-folded description.
    Substring { needle: String, negated: bool },
}

impl Predicate {
    fn compile(filter: &Filter) -> ResultEngine<Self> {
        filter.validate()?;

        let cmp = match filter.op {
            FilterOp::LessThan => Comparison::Lt,
            FilterOp::LessOrEqual => Comparison::Lte,
            FilterOp::GreaterThan => Comparison::Gt,
            FilterOp::GreaterOrEqual => Comparison::Gte,
            FilterOp::Equal => Comparison::Eq,
            FilterOp::NotEqual => Comparison::Ne,
            FilterOp::Contains | FilterOp::NotContains => {
                let FilterValue::Text(text) = &filter.value else {
                    return Err(EngineError::InvalidTypeCombination(format!(
                        "substring search needs text, got {}",
                        filter.value
                    )));
                };
                return Ok(Self::Substring {
                    needle: util::fold_text(text),
                    negated: filter.op == FilterOp::NotContains,
                });
            }
        };

        Ok(Self::Compare {
            field: filter.field,
            cmp,
            operand: filter.value.clone(),
        })
    }

    fn expr(&self) -> SimpleExpr {
        match self {
            Self::Compare {
                field,
                cmp,
                operand,
            } => {
                let column = column_for(*field);
                let value = value_for(operand);
                match cmp {
                    Comparison::Lt => column.lt(value),
                    Comparison::Lte => column.lte(value),
                    Comparison::Gt => column.gt(value),
                    Comparison::Gte => column.gte(value),
                    Comparison::Eq => column.eq(value),
                    Comparison::Ne => column.ne(value),
                }
            }
            // instr() is a plain substring search: no pattern language, so
            // nothing in the needle needs escaping.
            Self::Substring { needle, negated } => {
                let position = Expr::expr(
                    Func::cust(Alias::new("instr"))
                        .arg(Expr::col((entry::Entity, entry::Column::DescriptionFold)))
                        .arg(needle.clone()),
                );
                if *negated {
                    position.eq(0)
                } else {
                    position.gt(0)
                }
            }
        }
    }

    fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::Compare {
                field,
                cmp,
                operand,
            } => {
                let ordering = match (field, operand) {
                    (FilterField::TransactionDate, FilterValue::Time(t)) => {
                        Some(entry.date.cmp(t))
                    }
                    (FilterField::RecordCreationDate, FilterValue::Time(t)) => {
                        Some(entry.create_time.cmp(t))
                    }
                    (FilterField::Amount, FilterValue::Number(n)) => entry.amount.partial_cmp(n),
                    (FilterField::Description, FilterValue::Text(s)) => {
                        Some(entry.description.as_str().cmp(s.as_str()))
                    }
                    _ => None,
                };
                cmp.holds(ordering)
            }
            Self::Substring { needle, negated } => {
                util::fold_text(&entry.description).contains(needle.as_str()) != *negated
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare {
                field,
                cmp,
                operand,
            } => write!(f, "{} {cmp:?} {operand}", field.as_str()),
            Self::Substring { needle, negated } => {
                let not = if *negated { "!" } else { "" };
                write!(f, "description {not}~ {needle:?}")
            }
        }
    }
}

fn column_for(field: FilterField) -> entry::Column {
    match field {
        FilterField::TransactionDate => entry::Column::Date,
        FilterField::Amount => entry::Column::Amount,
        FilterField::Description => entry::Column::Description,
        FilterField::RecordCreationDate => entry::Column::CreateTime,
    }
}

fn value_for(operand: &FilterValue) -> Value {
    match operand {
        FilterValue::Time(t) => (*t).into(),
        FilterValue::Number(n) => (*n).into(),
        FilterValue::Text(s) => s.clone().into(),
    }
}

/// Compiled, immutable conjunction of predicates. The default value matches
/// every entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    predicates: Vec<Predicate>,
}

impl Query {
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Compiles filters into a query. Either every filter compiles or none
    /// does.
    pub fn compile(filters: &[Filter]) -> ResultEngine<Self> {
        let predicates = filters
            .iter()
            .map(Predicate::compile)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Self { predicates })
    }

    pub fn is_match_all(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub(crate) fn condition(&self) -> Condition {
        self.predicates
            .iter()
            .fold(Condition::all(), |cond, predicate| cond.add(predicate.expr()))
    }

    /// Evaluates the query against an entry without touching the store.
    pub fn matches(&self, entry: &Entry) -> bool {
        self.predicates.iter().all(|p| p.matches(entry))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match_all() {
            return write!(f, "<all>");
        }
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

pub(crate) trait ApplyQuery: QueryFilter + Sized {
    fn apply_query(self, query: &Query) -> Self;
}

impl<T> ApplyQuery for T
where
    T: QueryFilter + Sized,
{
    fn apply_query(self, query: &Query) -> Self {
        if query.is_match_all() {
            self
        } else {
            self.filter(query.condition())
        }
    }
}
