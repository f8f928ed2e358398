//! The primitive type lattice
//!
//! Inference only ever picks from a fixed set of XSD built-in types. A
//! [`TypeCandidate`] is the set of those types that accept every value seen
//! so far; intersecting it with the candidates of a new value narrows it.
//! `string` accepts everything, so it is a member of every candidate set.

use bitflags::bitflags;
use std::fmt;

/// A member of the inference lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    /// xs:boolean
    Boolean,
    /// xs:byte
    Byte,
    /// xs:unsignedByte
    UnsignedByte,
    /// xs:short
    Short,
    /// xs:unsignedShort
    UnsignedShort,
    /// xs:int
    Int,
    /// xs:unsignedInt
    UnsignedInt,
    /// xs:long
    Long,
    /// xs:unsignedLong
    UnsignedLong,
    /// xs:integer
    Integer,
    /// xs:decimal
    Decimal,
    /// xs:float
    Float,
    /// xs:double
    Double,
    /// xs:duration
    Duration,
    /// xs:dateTime
    DateTime,
    /// xs:time
    Time,
    /// xs:date
    Date,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:string
    String,
}

impl Primitive {
    /// Every lattice member, in declaration order
    pub const ALL: [Primitive; 19] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::UnsignedByte,
        Primitive::Short,
        Primitive::UnsignedShort,
        Primitive::Int,
        Primitive::UnsignedInt,
        Primitive::Long,
        Primitive::UnsignedLong,
        Primitive::Integer,
        Primitive::Decimal,
        Primitive::Float,
        Primitive::Double,
        Primitive::Duration,
        Primitive::DateTime,
        Primitive::Time,
        Primitive::Date,
        Primitive::GYearMonth,
        Primitive::String,
    ];

    /// XSD local type name
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::UnsignedByte => "unsignedByte",
            Primitive::Short => "short",
            Primitive::UnsignedShort => "unsignedShort",
            Primitive::Int => "int",
            Primitive::UnsignedInt => "unsignedInt",
            Primitive::Long => "long",
            Primitive::UnsignedLong => "unsignedLong",
            Primitive::Integer => "integer",
            Primitive::Decimal => "decimal",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Duration => "duration",
            Primitive::DateTime => "dateTime",
            Primitive::Time => "time",
            Primitive::Date => "date",
            Primitive::GYearMonth => "gYearMonth",
            Primitive::String => "string",
        }
    }

    /// Look up a lattice member by XSD local type name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// The single-member candidate set
    pub fn flag(self) -> TypeCandidate {
        match self {
            Primitive::Boolean => TypeCandidate::BOOLEAN,
            Primitive::Byte => TypeCandidate::BYTE,
            Primitive::UnsignedByte => TypeCandidate::UNSIGNED_BYTE,
            Primitive::Short => TypeCandidate::SHORT,
            Primitive::UnsignedShort => TypeCandidate::UNSIGNED_SHORT,
            Primitive::Int => TypeCandidate::INT,
            Primitive::UnsignedInt => TypeCandidate::UNSIGNED_INT,
            Primitive::Long => TypeCandidate::LONG,
            Primitive::UnsignedLong => TypeCandidate::UNSIGNED_LONG,
            Primitive::Integer => TypeCandidate::INTEGER,
            Primitive::Decimal => TypeCandidate::DECIMAL,
            Primitive::Float => TypeCandidate::FLOAT,
            Primitive::Double => TypeCandidate::DOUBLE,
            Primitive::Duration => TypeCandidate::DURATION,
            Primitive::DateTime => TypeCandidate::DATE_TIME,
            Primitive::Time => TypeCandidate::TIME,
            Primitive::Date => TypeCandidate::DATE,
            Primitive::GYearMonth => TypeCandidate::G_YEAR_MONTH,
            Primitive::String => TypeCandidate::STRING,
        }
    }

    /// Lattice members that accept every value of `self`.
    ///
    /// Used when a declaration arrives already typed (from a seed schema) and
    /// the value history behind that type is gone. Float is only kept where
    /// single precision is exact for the whole value space.
    pub fn widening(self) -> TypeCandidate {
        use TypeCandidate as T;
        let approximate = T::DECIMAL | T::DOUBLE | T::STRING;
        match self {
            Primitive::Byte => {
                T::BYTE | T::SHORT | T::INT | T::LONG | T::INTEGER | T::FLOAT | approximate
            }
            Primitive::UnsignedByte => {
                T::UNSIGNED_BYTE
                    | T::SHORT
                    | T::UNSIGNED_SHORT
                    | T::INT
                    | T::UNSIGNED_INT
                    | T::LONG
                    | T::UNSIGNED_LONG
                    | T::INTEGER
                    | T::FLOAT
                    | approximate
            }
            Primitive::Short => T::SHORT | T::INT | T::LONG | T::INTEGER | T::FLOAT | approximate,
            Primitive::UnsignedShort => {
                T::UNSIGNED_SHORT
                    | T::INT
                    | T::UNSIGNED_INT
                    | T::LONG
                    | T::UNSIGNED_LONG
                    | T::INTEGER
                    | T::FLOAT
                    | approximate
            }
            Primitive::Int => T::INT | T::LONG | T::INTEGER | approximate,
            Primitive::UnsignedInt => {
                T::UNSIGNED_INT | T::LONG | T::UNSIGNED_LONG | T::INTEGER | approximate
            }
            Primitive::Long => T::LONG | T::INTEGER | approximate,
            Primitive::UnsignedLong => T::UNSIGNED_LONG | T::INTEGER | approximate,
            Primitive::Integer => T::INTEGER | approximate,
            Primitive::Decimal => approximate,
            Primitive::Float => T::FLOAT | T::DOUBLE | T::STRING,
            other => other.flag() | T::STRING,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of lattice members consistent with a value (or a value history)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeCandidate: u32 {
        /// xs:boolean
        const BOOLEAN = 1 << 0;
        /// xs:byte
        const BYTE = 1 << 1;
        /// xs:unsignedByte
        const UNSIGNED_BYTE = 1 << 2;
        /// xs:short
        const SHORT = 1 << 3;
        /// xs:unsignedShort
        const UNSIGNED_SHORT = 1 << 4;
        /// xs:int
        const INT = 1 << 5;
        /// xs:unsignedInt
        const UNSIGNED_INT = 1 << 6;
        /// xs:long
        const LONG = 1 << 7;
        /// xs:unsignedLong
        const UNSIGNED_LONG = 1 << 8;
        /// xs:integer
        const INTEGER = 1 << 9;
        /// xs:decimal
        const DECIMAL = 1 << 10;
        /// xs:float
        const FLOAT = 1 << 11;
        /// xs:double
        const DOUBLE = 1 << 12;
        /// xs:duration
        const DURATION = 1 << 13;
        /// xs:dateTime
        const DATE_TIME = 1 << 14;
        /// xs:time
        const TIME = 1 << 15;
        /// xs:date
        const DATE = 1 << 16;
        /// xs:gYearMonth
        const G_YEAR_MONTH = 1 << 17;
        /// xs:string
        const STRING = 1 << 18;

        /// Every bounded and unbounded integer type
        const INTEGERS = Self::BYTE.bits() | Self::UNSIGNED_BYTE.bits()
            | Self::SHORT.bits() | Self::UNSIGNED_SHORT.bits()
            | Self::INT.bits() | Self::UNSIGNED_INT.bits()
            | Self::LONG.bits() | Self::UNSIGNED_LONG.bits()
            | Self::INTEGER.bits();
        /// Binary floating point types
        const FLOATING = Self::FLOAT.bits() | Self::DOUBLE.bits();
    }
}

/// Resolution order: the first member present in a candidate set is its type.
///
/// Within each integer width the unsigned type comes first, so a value like
/// `1` resolves to `unsignedByte` until a negative value clears it.
const RESOLUTION_ORDER: [Primitive; 19] = [
    Primitive::Boolean,
    Primitive::UnsignedByte,
    Primitive::Byte,
    Primitive::UnsignedShort,
    Primitive::Short,
    Primitive::UnsignedInt,
    Primitive::Int,
    Primitive::UnsignedLong,
    Primitive::Long,
    Primitive::Integer,
    Primitive::Decimal,
    Primitive::Float,
    Primitive::Double,
    Primitive::Duration,
    Primitive::DateTime,
    Primitive::Time,
    Primitive::Date,
    Primitive::GYearMonth,
    Primitive::String,
];

impl TypeCandidate {
    /// The candidate set of a value that only `string` accepts
    pub fn string_only() -> Self {
        TypeCandidate::STRING
    }

    /// Intersect with another observation. `string` always survives.
    pub fn narrow(self, other: TypeCandidate) -> Self {
        (self & other) | TypeCandidate::STRING
    }

    /// Whether only `string` is left
    pub fn is_string_only(self) -> bool {
        (self - TypeCandidate::STRING).is_empty()
    }

    /// Most specific member of the set
    pub fn resolve(self) -> Primitive {
        RESOLUTION_ORDER
            .iter()
            .copied()
            .find(|p| self.contains(p.flag()))
            .unwrap_or(Primitive::String)
    }

    /// Members of the set as primitives, in declaration order
    pub fn primitives(self) -> impl Iterator<Item = Primitive> {
        Primitive::ALL
            .into_iter()
            .filter(move |p| self.contains(p.flag()))
    }
}
