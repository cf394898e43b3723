/// Turn a snake_case schema key into a display title.
///
/// Underscores become spaces and every word gets an upper-case first letter.
///
/// # Examples
///
/// ```
/// use formtree_util::strings::title_case;
///
/// assert_eq!(title_case("order_qty"), "Order Qty");
/// assert_eq!(title_case("px"), "Px");
/// assert_eq!(title_case("__x"), "X");
/// ```
pub fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("security_id"), "Security Id");
        assert_eq!(title_case("alreadyCamel"), "AlreadyCamel");
    }
}
