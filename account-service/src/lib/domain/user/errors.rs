use thiserror::Error;

use crate::domain::errors::AppError;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number must contain {min} to {max} digits, got {actual}")]
    InvalidLength {
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Phone number may only contain digits and an optional leading '+'")]
    InvalidCharacters,
}

/// Error for plaintext password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters")]
    TooShort { min: usize },

    #[error("Password too long: maximum {max} characters")]
    TooLong { max: usize },
}

/// Error for unknown status or role names
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserAttributeError {
    #[error("Unknown user status: {0}")]
    UnknownStatus(String),

    #[error("Unknown user role: {0}")]
    UnknownRole(String),
}

macro_rules! validation_error {
    ($($source:ty => $label:literal),* $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(err: $source) -> Self {
                    AppError::validation(format!(concat!($label, ": {}"), err))
                }
            }
        )*
    };
}

validation_error! {
    UserIdError => "Invalid user ID",
    UsernameError => "Invalid username",
    EmailError => "Invalid email",
    PhoneError => "Invalid phone",
    PasswordPolicyError => "Invalid password",
    UserAttributeError => "Invalid attribute",
}
