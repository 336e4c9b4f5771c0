// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    Upper,
    Lower,
}

impl Transform {
    pub const ALL: [Self; 3] = [Self::Trim, Self::Upper, Self::Lower];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trim => "TRIM",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRIM" => Some(Self::Trim),
            "UPPER" => Some(Self::Upper),
            "LOWER" => Some(Self::Lower),
            _ => None,
        }
    }

    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Trim => value.trim().to_owned(),
            Self::Upper => value.to_uppercase(),
            Self::Lower => value.to_lowercase(),
        }
    }
}

/// Applies the transform called `name`; unknown names leave `value` as is.
pub fn apply_named(name: &str, value: &str) -> String {
    match Transform::parse(name) {
        Some(kind) => kind.apply(value),
        None => value.to_owned(),
    }
}
