//! Field rules checked before anything reaches the store.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ServiceError;

pub const CATEGORY_NAME_MAX: usize = 100;
pub const AUTHOR_NAME_MAX: usize = 200;
pub const BOOK_TITLE_MAX: usize = 200;
pub const PUBLISHER_MAX: usize = 200;
pub const CATEGORY_SLUG_MAX: usize = 100;
pub const AUTHOR_SLUG_MAX: usize = 200;
pub const BOOK_SLUG_MAX: usize = 200;
pub const WEBSITE_MAX: usize = 200;
pub const EMAIL_MAX: usize = 254;
pub const USERNAME_MAX: usize = 150;
pub const PERSON_NAME_MAX: usize = 150;
pub const PHONE_NUMBER_MAX: usize = 15;
pub const PASSWORD_MIN: usize = 8;

/// Largest price a `NUMERIC(10,2)` column holds, in cents.
pub const PRICE_MAX_CENTS: i64 = 99_999_999_99;

fn at_most(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.chars().count() > max {
        return Err(ServiceError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn bounded(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be blank")));
    }
    at_most(field, value, max)
}

pub fn category_name(name: &str) -> Result<(), ServiceError> {
    bounded("name", name, CATEGORY_NAME_MAX)
}

pub fn author_name(name: &str) -> Result<(), ServiceError> {
    bounded("name", name, AUTHOR_NAME_MAX)
}

pub fn book_title(title: &str) -> Result<(), ServiceError> {
    bounded("title", title, BOOK_TITLE_MAX)
}

pub fn publisher(publisher: &str) -> Result<(), ServiceError> {
    bounded("publisher", publisher, PUBLISHER_MAX)
}

pub fn slug(slug: &str, max: usize) -> Result<(), ServiceError> {
    at_most("slug", slug, max)
}

pub fn website(website: &str) -> Result<(), ServiceError> {
    at_most("website", website, WEBSITE_MAX)
}

/// `first_name` and `last_name`; both may be empty.
pub fn person_name(field: &str, name: &str) -> Result<(), ServiceError> {
    at_most(field, name, PERSON_NAME_MAX)
}

/// Exactly 13 ASCII digits.
pub fn isbn(isbn: &str) -> Result<(), ServiceError> {
    if isbn.len() == 13 && isbn.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ServiceError::validation("isbn must be exactly 13 digits"))
    }
}

/// Positive, and at most [`PRICE_MAX_CENTS`] once rounded to cents.
pub fn price(price: Decimal) -> Result<(), ServiceError> {
    if price <= Decimal::ZERO {
        return Err(ServiceError::validation("price must be greater than 0"));
    }
    let max = Decimal::new(PRICE_MAX_CENTS, 2);
    if price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) > max {
        return Err(ServiceError::validation(format!("price must be at most {max}")));
    }
    Ok(())
}

pub fn stock_quantity(stock: i32) -> Result<(), ServiceError> {
    if stock >= 0 {
        Ok(())
    } else {
        Err(ServiceError::validation("stock_quantity must not be negative"))
    }
}

pub fn pages(pages: i32) -> Result<(), ServiceError> {
    if pages >= 0 {
        Ok(())
    } else {
        Err(ServiceError::validation("pages must not be negative"))
    }
}

pub fn rating(rating: i16) -> Result<(), ServiceError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ServiceError::validation("rating must be between 1 and 5"))
    }
}

/// Letters, digits and `@.+-_`, at most 150 characters.
pub fn username(username: &str) -> Result<(), ServiceError> {
    let len = username.chars().count();
    if len == 0 || len > USERNAME_MAX {
        return Err(ServiceError::validation(format!(
            "username must be between 1 and {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(ServiceError::validation(
            "username may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub fn email(email: &str) -> Result<(), ServiceError> {
    at_most("email", email, EMAIL_MAX)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ServiceError::validation("enter a valid email address"))
    }
}

pub fn phone_number(phone: &str) -> Result<(), ServiceError> {
    if phone.chars().count() > PHONE_NUMBER_MAX {
        return Err(ServiceError::validation(format!(
            "phone_number must be at most {PHONE_NUMBER_MAX} characters"
        )));
    }
    Ok(())
}

/// At least 8 characters and not entirely numeric.
pub fn password_strength(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ServiceError::validation(format!(
            "password must contain at least {PASSWORD_MIN} characters"
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation("password must not be entirely numeric"));
    }
    Ok(())
}

pub fn password_confirmation(password: &str, confirm: &str) -> Result<(), ServiceError> {
    if password == confirm {
        Ok(())
    } else {
        Err(ServiceError::validation("passwords do not match"))
    }
}
