//! Locators: typed, ordered tuples that address nodes in a hierarchy.

use std::collections::BTreeMap;
use std::fmt;

use crate::codec;

/// A single locator component.
///
/// The codec dispatches on the variant, so two components of different kinds
/// never share an encoding (the string `"2"` and the integer `2` map to
/// different path segments).
///
/// Equality follows the encoding: two components are equal exactly when they
/// map to the same path segment. Sets compare as sets, and `0.0` equals
/// `-0.0`.
#[derive(Clone, Debug)]
pub enum Loc {
    Str(String),
    Int(i64),
    Float(f64),
    /// Ordered sequence, used for nested tuples such as reaction key lists.
    Seq(Vec<Loc>),
    /// Unordered collection. [`Loc::set`] keeps members sorted and unique;
    /// a set built from the variant directly still compares and encodes by
    /// its canonical member order.
    Set(Vec<Loc>),
    /// Named components, e.g. the constraint values of a constrained scan.
    Map(BTreeMap<String, Loc>),
    /// An identifier produced by [`crate::ident`].
    Id(String),
}

impl Loc {
    /// Create a set component, sorting and deduplicating by encoded form.
    pub fn set(items: impl IntoIterator<Item = impl Into<Loc>>) -> Self {
        let mut keyed: Vec<(String, Loc)> = items
            .into_iter()
            .map(Into::into)
            .map(|item| (codec::encode(&item), item))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        Loc::Set(keyed.into_iter().map(|(_, item)| item).collect())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Loc::Id(id.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Loc::Str(s) | Loc::Id(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Loc::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Loc::Float(f) => Some(*f),
            Loc::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Loc]> {
        match self {
            Loc::Seq(items) | Loc::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Loc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Loc::Str(a), Loc::Str(b)) | (Loc::Id(a), Loc::Id(b)) => a == b,
            (Loc::Int(a), Loc::Int(b)) => a == b,
            (Loc::Seq(a), Loc::Seq(b)) => a == b,
            (Loc::Map(a), Loc::Map(b)) => a == b,
            (Loc::Float(_), Loc::Float(_)) | (Loc::Set(_), Loc::Set(_)) => {
                codec::encode(self) == codec::encode(other)
            }
            _ => false,
        }
    }
}

impl Eq for Loc {}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", codec::encode(self))
    }
}

impl From<&str> for Loc {
    fn from(v: &str) -> Self {
        Loc::Str(v.to_string())
    }
}

impl From<String> for Loc {
    fn from(v: String) -> Self {
        Loc::Str(v)
    }
}

impl From<&String> for Loc {
    fn from(v: &String) -> Self {
        Loc::Str(v.clone())
    }
}

impl From<i64> for Loc {
    fn from(v: i64) -> Self {
        Loc::Int(v)
    }
}

impl From<i32> for Loc {
    fn from(v: i32) -> Self {
        Loc::Int(v as i64)
    }
}

impl From<u32> for Loc {
    fn from(v: u32) -> Self {
        Loc::Int(v as i64)
    }
}

impl From<usize> for Loc {
    fn from(v: usize) -> Self {
        Loc::Int(v as i64)
    }
}

impl From<f64> for Loc {
    fn from(v: f64) -> Self {
        Loc::Float(v)
    }
}

impl<T: Into<Loc>> From<Vec<T>> for Loc {
    fn from(v: Vec<T>) -> Self {
        Loc::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, T: Into<Loc>> From<BTreeMap<K, T>> for Loc {
    fn from(v: BTreeMap<K, T>) -> Self {
        Loc::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// An ordered tuple of locator components.
///
/// A prefix of length k addresses the node whose levels consume exactly k
/// components. Locators are values: every operation that extends or splits
/// one returns a new locator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locator {
    components: Vec<Loc>,
}

impl Locator {
    pub fn new(components: Vec<Loc>) -> Self {
        Locator { components }
    }

    /// The empty locator, addressing a chain's root.
    pub fn root() -> Self {
        Locator::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loc> {
        self.components.iter()
    }

    pub fn components(&self) -> &[Loc] {
        &self.components
    }

    /// The first `k` components (all of them when `k` exceeds the length).
    #[must_use]
    pub fn prefix(&self, k: usize) -> Locator {
        Locator {
            components: self.components[..k.min(self.len())].to_vec(),
        }
    }

    /// Split into the first `k` components and the rest.
    pub fn split_at(&self, k: usize) -> (Locator, Locator) {
        let k = k.min(self.len());
        let (head, tail) = self.components.split_at(k);
        (Locator::new(head.to_vec()), Locator::new(tail.to_vec()))
    }

    /// Append another locator's components.
    #[must_use]
    pub fn concat(&self, other: &Locator) -> Locator {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Locator { components }
    }

    #[must_use]
    pub fn push(mut self, component: impl Into<Loc>) -> Locator {
        self.components.push(component.into());
        self
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", component)?;
        }
        write!(f, "]")
    }
}

impl std::ops::Index<usize> for Locator {
    type Output = Loc;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

impl From<Vec<Loc>> for Locator {
    fn from(components: Vec<Loc>) -> Self {
        Locator { components }
    }
}

impl FromIterator<Loc> for Locator {
    fn from_iter<I: IntoIterator<Item = Loc>>(iter: I) -> Self {
        Locator {
            components: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Locator {
    type Item = &'a Loc;
    type IntoIter = std::slice::Iter<'a, Loc>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Build a [`Locator`] from anything convertible into [`Loc`].
///
/// # Example
///
/// ```rust
/// use locfs_core::{locator, Loc};
///
/// let locs = locator!["hf", "sto-3g", "U"];
/// assert_eq!(locs.len(), 3);
/// assert_eq!(locs[0], Loc::Str("hf".to_string()));
///
/// let nested = locator![vec![vec![0], vec![0, 0]], 2];
/// assert_eq!(nested.len(), 2);
/// ```
#[macro_export]
macro_rules! locator {
    () => {
        $crate::Locator::root()
    };
    ($($component:expr),+ $(,)?) => {
        $crate::Locator::new(vec![$($crate::Loc::from($component)),+])
    };
}
