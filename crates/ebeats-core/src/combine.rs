//! Sample-wise combination of two buffers.

use crate::math::saturate;

/// Binary operator applied by [`Combine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CombineType {
    /// `(a + b) >> 1`
    #[default]
    Mix,
    /// `(a * b) >> 15`, ring modulation in Q15.
    Mul,
    /// `(a - b) >> 1`
    Sub,
    /// `max(a, b)`
    Max,
    /// `min(a, b)`
    Min,
    /// `a & b` on the raw bits.
    And,
    /// `a | b` on the raw bits.
    Or,
    /// `a ^ b` on the raw bits.
    Xor,
    /// Reflect `a` once at `±|b|`.
    Fold,
}

impl CombineType {
    /// Every operator in index order.
    pub const ALL: [CombineType; 9] = [
        CombineType::Mix,
        CombineType::Mul,
        CombineType::Sub,
        CombineType::Max,
        CombineType::Min,
        CombineType::And,
        CombineType::Or,
        CombineType::Xor,
        CombineType::Fold,
    ];

    /// Stable index of this operator.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Operator at `index`, or `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable short name.
    pub fn nick(self) -> &'static str {
        match self {
            CombineType::Mix => "mix",
            CombineType::Mul => "mul",
            CombineType::Sub => "sub",
            CombineType::Max => "max",
            CombineType::Min => "min",
            CombineType::And => "and",
            CombineType::Or => "or",
            CombineType::Xor => "xor",
            CombineType::Fold => "fold",
        }
    }

    /// Look an operator up by its [`nick`](Self::nick).
    pub fn from_nick(nick: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.nick() == nick)
    }

    /// Apply the operator to one pair of samples.
    ///
    /// Widened to `i32` and saturated, so no operator can wrap.
    ///
    /// ```rust
    /// use ebeats_core::CombineType;
    ///
    /// assert_eq!(CombineType::Mix.apply(1000, 3000), 2000);
    /// assert_eq!(CombineType::Mul.apply(i16::MIN, i16::MIN), i16::MAX);
    /// assert_eq!(CombineType::Fold.apply(9000, 5000), 1000);
    /// ```
    #[inline]
    pub fn apply(self, a: i16, b: i16) -> i16 {
        let (wa, wb) = (i32::from(a), i32::from(b));
        match self {
            CombineType::Mix => saturate((wa + wb) >> 1),
            CombineType::Mul => saturate((wa * wb) >> 15),
            CombineType::Sub => saturate((wa - wb) >> 1),
            CombineType::Max => a.max(b),
            CombineType::Min => a.min(b),
            CombineType::And => a & b,
            CombineType::Or => a | b,
            CombineType::Xor => a ^ b,
            CombineType::Fold => {
                let limit = wb.abs();
                let folded = if wa > 0 {
                    if wa > limit { 2 * limit - wa } else { wa }
                } else if wa < -limit {
                    -2 * limit - wa
                } else {
                    wa
                };
                saturate(folded)
            }
        }
    }
}

/// Merges a second buffer into a first one with a [`CombineType`].
///
/// # Example
///
/// ```rust
/// use ebeats_core::{Combine, CombineType};
///
/// let mut combine = Combine::new();
/// combine.set_combine(CombineType::Max);
///
/// let mut a = [1i16, -5, 300];
/// combine.process(&mut a, &[2, -9, 100]);
/// assert_eq!(a, [2, -5, 300]);
/// assert_eq!(combine.offset(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Combine {
    combine: CombineType,
    /// Samples combined since the last trigger.
    offset: u64,
}

impl Combine {
    /// Create a combiner using [`CombineType::Mix`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the operator.
    pub fn set_combine(&mut self, combine: CombineType) {
        self.combine = combine;
    }

    /// Current operator.
    pub fn combine(&self) -> CombineType {
        self.combine
    }

    /// Samples combined since the last trigger.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Restart the offset.
    pub fn trigger(&mut self) {
        self.offset = 0;
    }

    /// `a[i] = op(a[i], b[i])` over the shorter of the two buffers.
    pub fn process(&mut self, a: &mut [i16], b: &[i16]) {
        let op = self.combine;
        let count = a.len().min(b.len());
        for (x, &y) in a[..count].iter_mut().zip(&b[..count]) {
            *x = op.apply(*x, y);
        }
        self.offset += count as u64;
    }
}
