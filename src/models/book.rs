//! Book model

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// At least one non-whitespace character.
static NOT_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S").unwrap());

/// Persisted book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price: f64,
}

/// Create / update request body
#[derive(Debug, Default, Deserialize, Validate)]
pub struct BookPayload {
    #[validate(
        required(message = "cant be blank"),
        regex(path = *NOT_BLANK, message = "cant be blank")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "is required"),
        range(min = 0.0, message = "must not be negative")
    )]
    pub price: Option<f64>,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// Field values written by create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub price: f64,
    pub author: Option<String>,
    pub description: Option<String>,
}

impl BookPayload {
    /// Validate the payload and extract the values to store.
    pub fn into_new_book(self) -> AppResult<NewBook> {
        self.validate()?;

        let title = self
            .title
            .ok_or_else(|| AppError::Validation("title: cant be blank".to_string()))?;
        let price = self
            .price
            .ok_or_else(|| AppError::Validation("price: is required".to_string()))?;

        Ok(NewBook {
            title,
            price,
            author: self.author,
            description: self.description,
        })
    }
}

/// Title/price projection streamed by the catalog export
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CatalogEntry {
    pub title: String,
    pub price: f64,
}

impl CatalogEntry {
    /// `"<title>, <price>"` without the trailing newline. Line breaks inside the
    /// title are flattened to spaces so every entry stays on one line.
    pub fn to_line(&self) -> String {
        let title = self.title.replace(['\r', '\n'], " ");
        format!("{}, {}", title, format_price(self.price))
    }
}

/// Significant digits kept when printing a price
const PRICE_DIGITS: usize = 14;

/// Shortest rendering at 14 significant digits: `12.5`, `8`, `0.3`.
/// Magnitudes from 1e14 up, or below 1e-4, switch to `1.0E+14` form.
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "0".to_string();
    }
    if !price.is_finite() {
        return price.to_string();
    }

    let scientific = format!("{:.*e}", PRICE_DIGITS - 1, price);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if exponent < -4 || exponent >= PRICE_DIGITS as i32 {
        let mut mantissa = trim_fraction(mantissa).to_string();
        if !mantissa.contains('.') {
            mantissa.push_str(".0");
        }
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}E{}{}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (PRICE_DIGITS as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, price)).to_string()
    }
}

/// Drop trailing fractional zeros and a dangling decimal point.
fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
