use std::{fmt, num::ParseIntError, str::FromStr};

/// The caller-visible numeric identifier of a requirement, comment or data
/// attribute.
///
/// Ids are independent of a node's position in the document. Newly allocated
/// ids start at [`ItemId::FLOOR`]; smaller ids found in legacy documents are
/// kept as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u32);

impl ItemId {
    /// The smallest id handed out by allocation.
    pub const FLOOR: Self = Self(1000);

    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the smallest id at or above [`ItemId::FLOOR`] not contained in
    /// `used`.
    ///
    /// There is no counter state: the answer is recomputed from the ids
    /// currently in use, so ids freed by deletion become available again.
    /// Legacy ids below the floor never influence the result.
    #[must_use]
    pub fn smallest_unused<I>(used: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut taken: Vec<u32> = used
            .into_iter()
            .map(Self::get)
            .filter(|&id| id >= Self::FLOOR.0)
            .collect();
        taken.sort_unstable();
        taken.dedup();

        let mut candidate = Self::FLOOR.0;
        for id in taken {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        Self(candidate)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
