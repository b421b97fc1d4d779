use crate::{
    types::{Distance, GeoPoint},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

///
/// Predicate
///
/// Schema-agnostic predicate tree over indexed field paths.
/// Field validity is checked when the query is planned, not here.
///
/// - `And([])` matches every live entity
/// - `Or([])` matches nothing
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Predicate {
    Eq {
        field: String,
        value: Value,
    },
    Near {
        field: String,
        center: GeoPoint,
        distance: Distance,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Predicate {
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn near(field: impl Into<String>, center: GeoPoint, distance: Distance) -> Self {
        Self::Near {
            field: field.into(),
            center,
            distance,
        }
    }

    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Eq { .. } | Self::Near { .. } => 1,
            Self::And(children) | Self::Or(children) => {
                children.iter().map(Self::leaf_count).sum()
            }
        }
    }
}

// Combining with an existing node of the same kind appends instead of nesting.
impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match self {
            Self::And(mut children) => {
                children.push(rhs);
                Self::And(children)
            }
            lhs => Self::And(vec![lhs, rhs]),
        }
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.clone() & rhs.clone()
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self {
            Self::Or(mut children) => {
                children.push(rhs);
                Self::Or(children)
            }
            lhs => Self::Or(vec![lhs, rhs]),
        }
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.clone() | rhs.clone()
    }
}

/// Equality leaf.
#[must_use]
pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Predicate {
    Predicate::eq(field, value)
}

/// Geo radius leaf.
#[must_use]
pub fn near(field: impl Into<String>, center: GeoPoint, distance: Distance) -> Predicate {
    Predicate::near(field, center, distance)
}

#[must_use]
pub fn and(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::And(preds.into_iter().collect())
}

#[must_use]
pub fn or(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Or(preds.into_iter().collect())
}
