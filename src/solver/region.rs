//! Choosing between the two roots of a quadratic.

/// Which root of a quadratic a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Index 0, the `-sqrt(D)` root
    Lower,
    /// Index 1, the `+sqrt(D)` root
    Upper,
}

impl Branch {
    /// Both branches in selection order.
    pub const ORDER: [Branch; 2] = [Branch::Lower, Branch::Upper];

    /// Position of this branch in a root pair.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Branch::Lower => 0,
            Branch::Upper => 1,
        }
    }

    /// Pick this branch's value out of a pair.
    #[inline]
    pub fn pick<T: Copy>(self, pair: &[T; 2]) -> T {
        pair[self.index()]
    }
}

/// First root (index 0, then index 1) accepted by `valid`.
pub fn first_valid<T: Copy>(roots: &[T; 2], mut valid: impl FnMut(T) -> bool) -> Option<Branch> {
    Branch::ORDER.into_iter().find(|b| valid(b.pick(roots)))
}
