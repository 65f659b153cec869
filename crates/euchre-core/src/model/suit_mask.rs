use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Bit-mask of suits; records the suits a seat is known to be void in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SuitMask(u8);

impl SuitMask {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, suit: Suit) -> bool {
        let bit = 1 << suit as u8;
        self.0 & bit != 0
    }

    pub fn with(mut self, suit: Suit) -> Self {
        let bit = 1 << suit as u8;
        self.0 |= bit;
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when every suit in `self` is also in `other`.
    pub fn is_subset(self, other: SuitMask) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Suit> {
        Suit::ALL.into_iter().filter(move |suit| self.contains(*suit))
    }
}

impl FromIterator<Suit> for SuitMask {
    fn from_iter<I: IntoIterator<Item = Suit>>(iter: I) -> Self {
        iter.into_iter().fold(SuitMask::EMPTY, SuitMask::with)
    }
}

impl fmt::Display for SuitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for suit in self.iter() {
            write!(f, "{suit}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for SuitMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for SuitMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let suits = Vec::<Suit>::deserialize(deserializer)?;
        Ok(suits.into_iter().collect())
    }
}
