use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::checksum::{check_digit_for, normalize, split_body, BODY_LEN, FULL_LEN};

/// Leading letter of a RIF, identifying who holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxpayerKind {
    /// `V`: Venezuelan natural person.
    NaturalPerson,
    /// `E`: foreign national.
    ForeignNational,
    /// `J`: juridical person (companies).
    JuridicalPerson,
    /// `P`: passport holder.
    PassportHolder,
    /// `G`: government entity.
    Government,
}

impl TaxpayerKind {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'V' => Some(Self::NaturalPerson),
            'E' => Some(Self::ForeignNational),
            'J' => Some(Self::JuridicalPerson),
            'P' => Some(Self::PassportHolder),
            'G' => Some(Self::Government),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::NaturalPerson => 'V',
            Self::ForeignNational => 'E',
            Self::JuridicalPerson => 'J',
            Self::PassportHolder => 'P',
            Self::Government => 'G',
        }
    }

    pub(crate) fn weight(self) -> u32 {
        match self {
            Self::NaturalPerson => 1,
            Self::ForeignNational => 2,
            Self::JuridicalPerson => 3,
            Self::PassportHolder => 4,
            Self::Government => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NaturalPerson => "Persona natural",
            Self::ForeignNational => "Extranjero",
            Self::JuridicalPerson => "Persona jurídica",
            Self::PassportHolder => "Pasaporte",
            Self::Government => "Ente gubernamental",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RifError {
    #[error("RIF '{input}' must be a letter (V, E, J, P, G) followed by 9 digits")]
    InvalidFormat { input: String },
    #[error("RIF '{input}' has check digit {found}, expected {expected}")]
    CheckDigitMismatch { input: String, expected: u8, found: u8 },
}

/// A RIF whose check digit has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxId {
    kind: TaxpayerKind,
    digits: [u8; 8],
    check_digit: u8,
}

impl TaxId {
    /// Normalizes and verifies raw user input.
    pub fn parse(raw: &str) -> Result<Self, RifError> {
        let normalized = normalize(raw);
        let invalid = || RifError::InvalidFormat {
            input: raw.to_string(),
        };

        if normalized.len() != FULL_LEN {
            return Err(invalid());
        }

        let (body, tail) = normalized.split_at(BODY_LEN);
        let (kind, digits) = split_body(body).ok_or_else(invalid)?;
        let found = match tail.as_bytes() {
            [digit] if digit.is_ascii_digit() => digit - b'0',
            _ => return Err(invalid()),
        };

        let expected = check_digit_for(kind, &digits);
        if expected != found {
            return Err(RifError::CheckDigitMismatch {
                input: raw.to_string(),
                expected,
                found,
            });
        }

        Ok(Self {
            kind,
            digits,
            check_digit: expected,
        })
    }

    /// Builds an identifier from a letter + 8 digit body, computing its digit.
    pub fn from_body(raw_body: &str) -> Result<Self, RifError> {
        let normalized = normalize(raw_body);
        let (kind, digits) = split_body(&normalized).ok_or_else(|| RifError::InvalidFormat {
            input: raw_body.to_string(),
        })?;

        Ok(Self {
            kind,
            digits,
            check_digit: check_digit_for(kind, &digits),
        })
    }

    pub fn kind(&self) -> TaxpayerKind {
        self.kind
    }

    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    pub fn body(&self) -> String {
        let mut body = String::with_capacity(BODY_LEN);
        body.push(self.kind.letter());
        body.extend(self.digits.iter().map(|digit| char::from(b'0' + digit)));
        body
    }

    /// The ten character storage form, e.g. `J123456784`.
    pub fn compact(&self) -> String {
        format!("{}{}", self.body(), self.check_digit)
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body();
        write!(f, "{}-{}-{}", &body[..1], &body[1..], self.check_digit)
    }
}

impl FromStr for TaxId {
    type Err = RifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TaxId {
    type Error = RifError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaxId> for String {
    fn from(value: TaxId) -> Self {
        value.compact()
    }
}
