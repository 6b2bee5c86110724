//! Input validation helpers
//!
//! Length and range checks come from the `validator` derives on the shared
//! payloads. The rules here cover what derives cannot express: decimal
//! precision, phone shape, password strength, trimmed names and date spans.
//! Everything funnels into one `AppError` with per-field messages (422).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode, FieldErrors};
use shared::models::{MenuItemCreate, MenuItemUpdate, OrderCreate, RegisterRequest};
use shared::util::{clean_phone, normalize_email};
use validator::{Validate, ValidationErrors};

// ── Limits ──────────────────────────────────────────────────────────

pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const MAX_PRICE: Decimal = Decimal::from_parts(99999, 0, 0, false, 2);
pub const MAX_PRICE_SCALE: u32 = 2;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;

pub const MIN_PHONE_DIGITS: usize = 10;
pub const MAX_PHONE_DIGITS: usize = 15;

pub const MAX_ORDER_LINES: usize = 50;

pub const MIN_TABLE_NUMBER: i32 = 1;
pub const MAX_TABLE_NUMBER: i32 = 999;

pub const MAX_DATE_RANGE_DAYS: i64 = 365;

pub const DEFAULT_BEST_SELLER_LIMIT: i64 = 10;
pub const MAX_BEST_SELLER_LIMIT: i64 = 50;
pub const DEFAULT_BEST_SELLER_DAYS: i64 = 30;

pub const MAX_SEARCH_LEN: usize = 100;
pub const DEFAULT_SEARCH_LIMIT: i64 = 20;
pub const MAX_SEARCH_LIMIT: i64 = 100;

// ── Field collector ─────────────────────────────────────────────────

/// Accumulates field messages from derives and hand-written rules
#[derive(Default)]
pub struct FieldChecker {
    fields: FieldErrors,
    /// Domain code per field, reported when that field is the only failure
    codes: Vec<(String, ErrorCode)>,
}

impl FieldChecker {
    /// Seed from a derive result
    pub fn from_derive(result: Result<(), ValidationErrors>) -> Self {
        let fields = match result {
            Ok(()) => FieldErrors::new(),
            Err(errors) => AppError::from(errors).field_errors.unwrap_or_default(),
        };
        Self {
            fields,
            codes: Vec::new(),
        }
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(msg) = result {
            self.fields.entry(field.to_string()).or_default().push(msg);
        }
        self
    }

    /// Like `check`, tagging the field with a domain error code
    pub fn check_coded(
        &mut self,
        field: &str,
        code: ErrorCode,
        result: Result<(), String>,
    ) -> &mut Self {
        if result.is_err() {
            self.tag(field, code);
        }
        self.check(field, result)
    }

    /// Attach a domain code to a field another rule may already have failed
    pub fn tag(&mut self, field: &str, code: ErrorCode) -> &mut Self {
        self.codes.push((field.to_string(), code));
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.fields.is_empty() {
            return Ok(());
        }
        let single_code = match self.fields.keys().next() {
            Some(field) if self.fields.len() == 1 => self
                .codes
                .iter()
                .find(|(tagged, _)| tagged == field)
                .map(|(_, code)| *code),
            _ => None,
        };
        let mut err = AppError::validation_fields(self.fields);
        if let Some(code) = single_code {
            err.code = code;
            err.message = code.message().to_string();
        }
        Err(err)
    }
}

// ── Single rules ────────────────────────────────────────────────────

/// 0.01 ≤ price ≤ 999.99 with at most two decimal places
pub fn validate_price(price: Decimal) -> Result<(), String> {
    if price.scale() > MAX_PRICE_SCALE {
        return Err("price must have at most 2 decimal places".into());
    }
    if price < MIN_PRICE {
        return Err("price must be at least 0.01".into());
    }
    if price > MAX_PRICE {
        return Err("price must not exceed 999.99".into());
    }
    Ok(())
}

/// 8–128 chars with at least one upper, one lower and one digit
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("password must contain an uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("password must contain a lowercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("password must contain a digit".into());
    }
    Ok(())
}

/// Person or restaurant name, 2–100 chars once trimmed
pub fn validate_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(format!(
            "must be between {MIN_NAME_LEN} and {MAX_NAME_LEN} characters"
        ));
    }
    Ok(())
}

/// Cleaned phone: optional `+`, then 10–15 digits
pub fn validate_phone(cleaned: &str) -> Result<(), String> {
    let digits = cleaned.strip_prefix('+').unwrap_or(cleaned);
    let ok = digits.chars().all(|c| c.is_ascii_digit())
        && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len());
    if ok {
        Ok(())
    } else {
        Err(format!(
            "phone number must contain {MIN_PHONE_DIGITS} to {MAX_PHONE_DIGITS} digits"
        ))
    }
}

pub fn validate_table_number(table_number: i32) -> Result<(), AppError> {
    if (MIN_TABLE_NUMBER..=MAX_TABLE_NUMBER).contains(&table_number) {
        return Ok(());
    }
    Err(AppError::new(shared::error::ErrorCode::InvalidTableNumber)
        .with_field_error("table_number", "must be between 1 and 999"))
}

/// start ≤ end and at most a year apart
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::validation("start_date must not be after end_date")
            .with_field_error("start_date", "must not be after end_date"));
    }
    if (end - start).num_days() > MAX_DATE_RANGE_DAYS {
        return Err(AppError::validation("Date range must not exceed 365 days")
            .with_field_error("end_date", "range must not exceed 365 days"));
    }
    Ok(())
}

/// Best-seller limit (1–50) and look-back days (1–365), defaults filled
pub fn validate_best_sellers(limit: Option<i64>, days: Option<i64>) -> Result<(usize, u64), AppError> {
    let limit = limit.unwrap_or(DEFAULT_BEST_SELLER_LIMIT);
    let days = days.unwrap_or(DEFAULT_BEST_SELLER_DAYS);
    let mut checker = FieldChecker::default();
    checker.check(
        "limit",
        if (1..=MAX_BEST_SELLER_LIMIT).contains(&limit) {
            Ok(())
        } else {
            Err(format!("must be between 1 and {MAX_BEST_SELLER_LIMIT}"))
        },
    );
    checker.check(
        "days",
        if (1..=MAX_DATE_RANGE_DAYS).contains(&days) {
            Ok(())
        } else {
            Err(format!("must be between 1 and {MAX_DATE_RANGE_DAYS}"))
        },
    );
    checker.finish()?;
    Ok((limit.unsigned_abs() as usize, days.unsigned_abs()))
}

/// Trimmed query text and a clamped result limit
pub fn validate_search(query: &str, limit: Option<i64>) -> Result<(String, i64), AppError> {
    let mut checker = FieldChecker::default();
    let q = query.trim();
    let len = q.chars().count();
    checker.check(
        "q",
        if (1..=MAX_SEARCH_LEN).contains(&len) {
            Ok(())
        } else {
            Err(format!("must be between 1 and {MAX_SEARCH_LEN} characters"))
        },
    );
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    checker.check(
        "limit",
        if (1..=MAX_SEARCH_LIMIT).contains(&limit) {
            Ok(())
        } else {
            Err(format!("must be between 1 and {MAX_SEARCH_LIMIT}"))
        },
    );
    checker.finish()?;
    Ok((q.to_string(), limit))
}

// ── Payload rules ───────────────────────────────────────────────────

/// Normalises email and restaurant name, then validates
pub fn check_register(req: &mut RegisterRequest) -> Result<(), AppError> {
    req.email = normalize_email(&req.email);
    req.restaurant_name = req.restaurant_name.trim().to_string();

    let mut checker = FieldChecker::from_derive(req.validate());
    checker.check_coded(
        "password",
        ErrorCode::WeakPassword,
        validate_password_strength(&req.password),
    );
    checker.finish()
}

pub fn check_menu_item_create(item: &mut MenuItemCreate) -> Result<(), AppError> {
    item.name = item.name.trim().to_string();
    item.category = item.category.trim().to_string();

    let mut checker = FieldChecker::from_derive(item.validate());
    checker.check_coded("price", ErrorCode::InvalidPrice, validate_price(item.price));
    checker.finish()
}

pub fn check_menu_item_update(item: &mut MenuItemUpdate) -> Result<(), AppError> {
    if item.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }
    if let Some(name) = item.name.as_mut() {
        *name = name.trim().to_string();
    }
    if let Some(category) = item.category.as_mut() {
        *category = category.trim().to_string();
    }

    let mut checker = FieldChecker::from_derive(item.validate());
    if let Some(price) = item.price {
        checker.check_coded("price", ErrorCode::InvalidPrice, validate_price(price));
    }
    checker.finish()
}

/// Trims the name and cleans the phone in place, then validates
pub fn check_order_create(order: &mut OrderCreate) -> Result<(), AppError> {
    order.customer_name = order.customer_name.trim().to_string();
    order.customer_phone = clean_phone(&order.customer_phone);

    let mut checker = FieldChecker::from_derive(order.validate());
    // The derive reports the `items` length message
    if order.items.is_empty() {
        checker.tag("items", ErrorCode::OrderEmpty);
    } else if order.items.len() > MAX_ORDER_LINES {
        checker.tag("items", ErrorCode::TooManyOrderItems);
    }
    checker.tag("table_number", ErrorCode::InvalidTableNumber);
    checker.check("customer_phone", validate_phone(&order.customer_phone));
    checker.check(
        "total_price",
        if order.total_price > Decimal::ZERO {
            Ok(())
        } else {
            Err("total_price must be positive".into())
        },
    );
    checker.finish()
}
