//! Numbers usable as payoffs and probabilities
use num_traits::Num;
use std::fmt::Debug;

/// An exact rational payoff
pub type Rational = num_rational::Rational64;

/// A number type for payoffs and chance probabilities
///
/// This is implemented for every type with field-like arithmetic that can be compared and shared
/// between threads, notably `f64` for approximate games and [Rational] for exact ones.
pub trait Payoff: Num + Clone + PartialOrd + Debug + Send + Sync {}

impl<T> Payoff for T where T: Num + Clone + PartialOrd + Debug + Send + Sync {}

/// `1 / num` without requiring a conversion from integers
pub(crate) fn uniform<T: Payoff>(num: usize) -> T {
    let total = (0..num).fold(T::zero(), |acc, _| acc + T::one());
    T::one() / total
}

/// The sum of a sequence of payoffs
pub(crate) fn sum<'a, T: Payoff + 'a>(vals: impl IntoIterator<Item = &'a T>) -> T {
    vals.into_iter()
        .fold(T::zero(), |acc, val| acc + val.clone())
}
