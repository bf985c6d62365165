/// Fill `{}` placeholders in `template` with `values`, left to right.
///
/// Substituted text is never rescanned, so a value containing `{}` is
/// inserted verbatim. Surplus placeholders are left in place.
///
/// # Example
/// ```
/// use storyscript::diagnostics::format_message;
/// let msg = format_message("`{}` has already been declared at line {}", &["a", "3"]);
/// assert_eq!(msg, "`a` has already been declared at line 3");
/// ```
pub fn format_message<S: AsRef<str>>(template: &str, values: &[S]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut rest = template;
    while let Some(index) = rest.find("{}") {
        result.push_str(&rest[..index]);
        match values.next() {
            Some(value) => result.push_str(value.as_ref()),
            None => result.push_str("{}"),
        }
        rest = &rest[index + 2..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::format_message;

    #[test]
    fn values_are_not_rescanned() {
        assert_eq!(format_message("`{}` and `{}`", &["{}", "b"]), "`{}` and `b`");
    }

    #[test]
    fn missing_values_leave_placeholders() {
        assert_eq!(format_message("{} {}", &["a"]), "a {}");
        assert_eq!(format_message::<&str>("plain", &[]), "plain");
    }
}
