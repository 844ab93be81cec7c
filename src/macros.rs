//! The [`flags!`](crate::flags!) macro for bit-flag values that (de)serialize
//! as combined name lists.

/// Declare a bit-flags type whose textual form is a list of member names
/// separated by `|` or `,`, e.g. `Second | FirstChoice`.
///
/// Each member may carry one alias in brackets; both the declared name and
/// the alias are accepted when parsing. `Display` and serialization always
/// use the declared names, joined with `, `, in declaration order.
///
/// ```
/// serde_piyaml::flags! {
///     pub struct Choices: u32 {
///         FirstChoice ["first"] = 0x1,
///         Second = 0x2,
///     }
/// }
///
/// let both: Choices = "Second | first".parse().unwrap();
/// assert_eq!(both, Choices::FirstChoice | Choices::Second);
/// assert_eq!(both.to_string(), "FirstChoice, Second");
/// ```
#[macro_export]
macro_rules! flags {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $repr:ty {
            $(
                $(#[$mmeta:meta])*
                $member:ident $([$alias:literal])? = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $repr,
        }

        #[allow(non_upper_case_globals)]
        impl $name {
            $(
                $(#[$mmeta])*
                $vis const $member: Self = Self { bits: $value };
            )+

            /// Member table: declared name, optional alias, bit pattern.
            const MEMBERS: &'static [(
                &'static str,
                ::core::option::Option<&'static str>,
                $repr,
            )] = &[
                $(
                    (::core::stringify!($member), {
                        let alias: ::core::option::Option<&'static str> =
                            ::core::option::Option::None;
                        $(let alias = ::core::option::Option::Some($alias);)?
                        alias
                    }, $value),
                )+
            ];

            /// The empty set.
            $vis const fn empty() -> Self {
                Self { bits: 0 }
            }

            /// Raw bit pattern.
            $vis const fn bits(self) -> $repr {
                self.bits
            }

            $vis const fn is_empty(self) -> bool {
                self.bits == 0
            }

            /// True when every bit of `other` is set in `self`.
            $vis const fn contains(self, other: Self) -> bool {
                self.bits & other.bits == other.bits
            }

            /// Reconstruct from a raw pattern; `None` if any bit is not a
            /// declared member bit.
            $vis const fn from_bits(bits: $repr) -> ::core::option::Option<Self> {
                let mut known: $repr = 0;
                let mut i = 0;
                while i < Self::MEMBERS.len() {
                    known |= Self::MEMBERS[i].2;
                    i += 1;
                }
                if bits & !known == 0 {
                    ::core::option::Option::Some(Self { bits })
                } else {
                    ::core::option::Option::None
                }
            }

            $vis fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            $vis fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl ::core::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self { bits: self.bits | rhs.bits }
            }
        }

        impl ::core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.bits |= rhs.bits;
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::FlagsParseError;

            /// Parses names separated by `|` or `,`. Whitespace around each
            /// name is ignored; empty pieces are skipped, so the empty string
            /// parses to the empty set.
            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let mut out = Self::empty();
                for piece in s.split(|c| c == ',' || c == '|') {
                    let piece = piece.trim();
                    if piece.is_empty() {
                        continue;
                    }
                    let mut matched = false;
                    for (name, alias, bits) in Self::MEMBERS {
                        if *name == piece || *alias == ::core::option::Option::Some(piece) {
                            out.bits |= *bits;
                            matched = true;
                            break;
                        }
                    }
                    if !matched {
                        return ::core::result::Result::Err(
                            $crate::FlagsParseError::unknown_member(piece),
                        );
                    }
                }
                ::core::result::Result::Ok(out)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut seen: $repr = 0;
                let mut first = true;
                for (name, _alias, bits) in Self::MEMBERS {
                    // Skip members whose bits were already covered, so a
                    // duplicate pattern is printed once.
                    if *bits != 0 && self.bits & *bits == *bits && seen & *bits != *bits {
                        if !first {
                            f.write_str(", ")?;
                        }
                        f.write_str(name)?;
                        first = false;
                        seen |= *bits;
                    }
                }
                ::core::result::Result::Ok(())
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                if self.is_empty() {
                    ::core::write!(f, "{}()", ::core::stringify!($name))
                } else {
                    ::core::write!(f, "{}({})", ::core::stringify!($name), self)
                }
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                struct FlagsVisitor;

                impl<'de> $crate::__private::serde::de::Visitor<'de> for FlagsVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        f: &mut ::core::fmt::Formatter<'_>,
                    ) -> ::core::fmt::Result {
                        ::core::write!(
                            f,
                            "a `|`- or `,`-separated list of {} members",
                            ::core::stringify!($name)
                        )
                    }

                    fn visit_str<E>(self, v: &str) -> ::core::result::Result<$name, E>
                    where
                        E: $crate::__private::serde::de::Error,
                    {
                        v.parse().map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(FlagsVisitor)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::flags! {
        struct Sample: u32 {
            FirstChoice ["first-choice"] = 0x1,
            Second = 0x2,
            Third = 0x4,
        }
    }

    #[test]
    fn parses_both_separators_and_aliases() {
        let v: Sample = "Second | first-choice".parse().unwrap();
        assert_eq!(v, Sample::FirstChoice | Sample::Second);
        let v: Sample = "Second, Third".parse().unwrap();
        assert_eq!(v, Sample::Second | Sample::Third);
        let v: Sample = "".parse().unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn unknown_member_is_reported_by_name() {
        let err = "Second | Nonsense".parse::<Sample>().unwrap_err();
        assert_eq!(err.member(), "Nonsense");
    }

    #[test]
    fn display_uses_declared_names_in_order() {
        let v = Sample::Third | Sample::FirstChoice;
        assert_eq!(v.to_string(), "FirstChoice, Third");
        assert_eq!(Sample::empty().to_string(), "");
    }

    #[test]
    fn raw_bits_round_trip() {
        assert_eq!(Sample::from_bits(0x3), Some(Sample::FirstChoice | Sample::Second));
        assert_eq!(Sample::from_bits(0x10), None);
        let mut v = Sample::Second;
        v.insert(Sample::Third);
        v.remove(Sample::Second);
        assert_eq!(v, Sample::Third);
    }
}
