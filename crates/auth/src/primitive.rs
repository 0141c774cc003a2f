use core::fmt;

use serde::{Deserialize, Serialize};

/// Capability tag granting access to a class of operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Primitive {
    Org,
    Apps,
    Resources,
    Profile,
    AppClusterOps,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::Org,
        Primitive::Apps,
        Primitive::Resources,
        Primitive::Profile,
        Primitive::AppClusterOps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Primitive::Org => "ORG",
            Primitive::Apps => "APPS",
            Primitive::Resources => "RESOURCES",
            Primitive::Profile => "PROFILE",
            Primitive::AppClusterOps => "APPCLUSTEROPS",
        }
    }

    /// Lower-cased header whose presence grants this primitive.
    pub fn header_name(self) -> &'static str {
        match self {
            Primitive::Org => "org",
            Primitive::Apps => "apps",
            Primitive::Resources => "resources",
            Primitive::Profile => "profile",
            Primitive::AppClusterOps => "appclusterops",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of granted (or required) primitives.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PrimitiveSet(u8);

impl PrimitiveSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn of(primitives: &[Primitive]) -> Self {
        primitives.iter().copied().collect()
    }

    pub fn insert(&mut self, primitive: Primitive) {
        self.0 |= primitive.bit();
    }

    pub fn contains(&self, primitive: Primitive) -> bool {
        self.0 & primitive.bit() != 0
    }

    pub fn is_superset_of(&self, other: &PrimitiveSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Primitives in `required` that this set does not grant.
    pub fn missing_from(&self, required: &PrimitiveSet) -> PrimitiveSet {
        PrimitiveSet(required.0 & !self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Primitive> + '_ {
        Primitive::ALL.into_iter().filter(|p| self.contains(*p))
    }
}

impl FromIterator<Primitive> for PrimitiveSet {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        let mut set = PrimitiveSet::empty();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

impl fmt::Display for PrimitiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Primitive::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
