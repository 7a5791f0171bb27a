//! Reusable predicates with consistently worded failure messages.
//!
//! Each helper returns `Ok(())` when the check holds and otherwise a
//! [`CheckError`] whose message starts with the caller-supplied `msg`.
//! Rules typically build a list of these and pass it through [`collect`].

use std::fmt::Display;

use crate::error::CheckError;

/// Keep only the failed checks.
pub fn collect<I>(results: I) -> Vec<CheckError>
where
    I: IntoIterator<Item = Result<(), CheckError>>,
{
    results.into_iter().filter_map(Result::err).collect()
}

/// Fails when `value` is the empty string.
///
/// # Errors
///
/// Returns `"<msg>: <value> must be non-empty"`.
pub fn not_empty(value: &str, msg: &str) -> Result<(), CheckError> {
    if value.is_empty() {
        Err(CheckError::new(format!("{msg}: {value} must be non-empty")))
    } else {
        Ok(())
    }
}

/// Fails unless `actual > bound`.
///
/// # Errors
///
/// Returns `"<msg>: <actual> is not greater than <bound>"`.
pub fn greater_than<T: PartialOrd + Display>(
    actual: T,
    bound: T,
    msg: &str,
) -> Result<(), CheckError> {
    if actual > bound {
        Ok(())
    } else {
        Err(CheckError::new(format!(
            "{msg}: {actual} is not greater than {bound}"
        )))
    }
}

/// Fails unless `actual >= bound`.
///
/// # Errors
///
/// Returns `"<msg>: <actual> is not greater than or equal to <bound>"`.
pub fn greater_than_or_equal_to<T: PartialOrd + Display>(
    actual: T,
    bound: T,
    msg: &str,
) -> Result<(), CheckError> {
    if actual >= bound {
        Ok(())
    } else {
        Err(CheckError::new(format!(
            "{msg}: {actual} is not greater than or equal to {bound}"
        )))
    }
}

/// Fails unless `actual <= bound`.
///
/// # Errors
///
/// Returns `"<msg>: <actual> is not less than or equal to <bound>"`.
pub fn less_than_or_equal_to<T: PartialOrd + Display>(
    actual: T,
    bound: T,
    msg: &str,
) -> Result<(), CheckError> {
    if actual <= bound {
        Ok(())
    } else {
        Err(CheckError::new(format!(
            "{msg}: {actual} is not less than or equal to {bound}"
        )))
    }
}

/// Fails unless `actual` is one of `options`.
///
/// # Errors
///
/// Returns `"<msg>: <actual> is not one of [a, b]"`.
pub fn is_in(actual: &str, options: &[&str], msg: &str) -> Result<(), CheckError> {
    if options.contains(&actual) {
        Ok(())
    } else {
        Err(CheckError::new(format!(
            "{msg}: {actual} is not one of [{}]",
            options.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_empty_message() {
        assert!(not_empty("x", "name").is_ok());
        assert_eq!(
            not_empty("", "cluster_name is required").unwrap_err().to_string(),
            "cluster_name is required:  must be non-empty"
        );
    }

    #[test]
    fn numeric_comparisons() {
        assert!(greater_than(1.5_f32, 0.0, "cpu").is_ok());
        assert_eq!(
            greater_than(-10.0_f32, 0.0, "slot_resource_requests.cpu must be > 0")
                .unwrap_err()
                .to_string(),
            "slot_resource_requests.cpu must be > 0: -10 is not greater than 0"
        );
        assert!(greater_than_or_equal_to(-1, -1, "x").is_ok());
        assert_eq!(
            greater_than_or_equal_to(-2, -1, "x").unwrap_err().to_string(),
            "x: -2 is not greater than or equal to -1"
        );
        assert!(less_than_or_equal_to(99, 99, "x").is_ok());
        assert!(less_than_or_equal_to(100, 99, "x").is_err());
    }

    #[test]
    fn membership() {
        assert!(is_in("https", &["http", "https"], "protocol").is_ok());
        assert_eq!(
            is_in("ftp", &["http", "https"], "protocol").unwrap_err().to_string(),
            "protocol: ftp is not one of [http, https]"
        );
    }

    #[test]
    fn collect_drops_passing_checks() {
        let errors = collect([not_empty("a", "x"), not_empty("", "y"), Ok(())]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "y:  must be non-empty");
    }
}
