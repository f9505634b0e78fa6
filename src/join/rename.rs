//! Rename templates for collision handling.
//!
//! A template is a string with `{...}` placeholders evaluated per collision.
//! Variables: `name` (the colliding component name), `source` (the file stem
//! of the document that lost the collision), `index` (the position of that
//! document in the join input list). A placeholder may apply one of the case
//! functions to a variable: `{pascalCase(name)}`, `{camelCase(source)}`,
//! `{snakeCase(name)}`, `{kebabCase(name)}`.

use crate::error::Error;

/// Variables available to a rename template.
#[derive(Debug, Clone)]
pub struct RenameContext<'a> {
    pub name: &'a str,
    pub source: &'a str,
    pub index: usize,
}

/// Render a template against a collision context.
///
/// # Errors
///
/// Returns a validation error for unbalanced braces, unknown variables, or
/// unknown functions.
pub fn render_template(template: &str, ctx: &RenameContext<'_>) -> Result<String, Error> {
    let mut out = String::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(Error::invalid_config(format!(
                "rename template '{template}' has an unbalanced '{{'"
            )));
        };
        out.push_str(&eval_placeholder(template, &after[..close], ctx)?);
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err(Error::invalid_config(format!(
            "rename template '{template}' has an unbalanced '}}'"
        )));
    }
    out.push_str(rest);
    Ok(out)
}

fn eval_placeholder(
    template: &str,
    token: &str,
    ctx: &RenameContext<'_>,
) -> Result<String, Error> {
    let token = token.trim();
    if let Some((function, rest)) = token.split_once('(') {
        let Some(variable) = rest.strip_suffix(')') else {
            return Err(Error::invalid_config(format!(
                "rename template '{template}' has a malformed function call '{{{token}}}'"
            )));
        };
        let value = lookup(template, variable.trim(), ctx)?;
        apply_case(template, function.trim(), &value)
    } else {
        lookup(template, token, ctx)
    }
}

fn lookup(template: &str, variable: &str, ctx: &RenameContext<'_>) -> Result<String, Error> {
    match variable {
        "name" => Ok(ctx.name.to_string()),
        "source" => Ok(ctx.source.to_string()),
        "index" => Ok(ctx.index.to_string()),
        other => Err(Error::invalid_config(format!(
            "rename template '{template}' references unknown variable '{other}' \
             (expected name, source, or index)"
        ))),
    }
}

fn apply_case(template: &str, function: &str, value: &str) -> Result<String, Error> {
    match function {
        "pascalCase" => Ok(pascal_case(value)),
        "camelCase" => Ok(camel_case(value)),
        "snakeCase" => Ok(snake_case(value)),
        "kebabCase" => Ok(kebab_case(value)),
        other => Err(Error::invalid_config(format!(
            "rename template '{template}' calls unknown function '{other}' \
             (expected pascalCase, camelCase, snakeCase, or kebabCase)"
        ))),
    }
}

// Word boundaries: `-`, `_`, whitespace, and lower-to-upper transitions.
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in text.chars() {
        if ch == '-' || ch == '_' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

#[must_use]
pub fn pascal_case(text: &str) -> String {
    split_words(text).iter().map(|w| capitalize(w)).collect()
}

#[must_use]
pub fn camel_case(text: &str) -> String {
    let words = split_words(text);
    let mut out = String::new();
    for (index, word) in words.iter().enumerate() {
        if index == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

#[must_use]
pub fn snake_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

#[must_use]
pub fn kebab_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>() -> RenameContext<'a> {
        RenameContext {
            name: "Account",
            source: "crm",
            index: 1,
        }
    }

    #[test]
    fn test_default_template() {
        let rendered = render_template(crate::constants::DEFAULT_RENAME_TEMPLATE, &ctx()).unwrap();
        assert_eq!(rendered, "Account_crm");
    }

    #[test]
    fn test_template_with_function() {
        assert_eq!(
            render_template("{name}{pascalCase(source)}", &ctx()).unwrap(),
            "AccountCrm"
        );
        assert_eq!(
            render_template("{snakeCase(name)}_{index}", &ctx()).unwrap(),
            "account_1"
        );
    }

    #[test]
    fn test_template_errors() {
        assert!(render_template("{name", &ctx()).is_err());
        assert!(render_template("name}", &ctx()).is_err());
        assert!(render_template("{unknown}", &ctx()).is_err());
        assert!(render_template("{upperCase(name)}", &ctx()).is_err());
        assert!(render_template("{pascalCase(name}", &ctx()).is_err());
    }

    #[test]
    fn test_case_functions() {
        assert_eq!(pascal_case("user-account_v2"), "UserAccountV2");
        assert_eq!(camel_case("UserAccount"), "userAccount");
        assert_eq!(snake_case("UserAccount"), "user_account");
        assert_eq!(kebab_case("user account"), "user-account");
    }
}
