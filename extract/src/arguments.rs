//! Positional argument derivation for frameworks that describe arguments
//! indirectly.
//!
//! Some command frameworks do not declare positional arguments at all. They
//! either list a closed set of accepted values or attach an argument-count
//! validator whose only observable property is its category. This module
//! turns those two hints into [`ArgumentInfo`] entries.

use opencli_core::{ArgsValidator, ArgumentInfo, MaxArgs};

/// Name used for a synthesized argument when the usage line has none.
pub const DEFAULT_ARGUMENT_NAME: &str = "args";

/// Derives positional arguments from a command's accepted values, argument
/// validator and usage line.
///
/// A non-empty `valid_args` takes priority: every value becomes one required
/// argument whose only allowed value is itself. Otherwise the validator's
/// [`arity`](ArgsValidator::arity) decides whether a single argument is
/// synthesized: only when it demands at least one value or caps the count
/// above zero. `NoArgs` and `Arbitrary` yield nothing.
///
/// # Examples
///
/// ```
/// use opencli_core::{ArgsValidator, MaxArgs};
/// use opencli_extract::arguments::derive_arguments;
///
/// let args = derive_arguments(&[], Some(ArgsValidator::MinimumArgs), "delete <name>");
/// assert_eq!(args.len(), 1);
/// assert_eq!(args[0].name, "<name>");
/// assert_eq!(args[0].max_args, MaxArgs::Unbounded);
///
/// assert!(derive_arguments(&[], Some(ArgsValidator::NoArgs), "list").is_empty());
/// ```
pub fn derive_arguments(
    valid_args: &[String],
    validator: Option<ArgsValidator>,
    usage: &str,
) -> Vec<ArgumentInfo> {
    if !valid_args.is_empty() {
        return valid_args
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let mut arg = ArgumentInfo::new(value.clone(), index + 1);
                arg.required = true;
                arg.valid_values = vec![value.clone()];
                arg
            })
            .collect();
    }

    let Some(validator) = validator else {
        return Vec::new();
    };

    let (min_args, max_args) = validator.arity();
    if min_args == 0 && !max_args.bound().is_some_and(|n| n > 0) {
        return Vec::new();
    }

    let mut arg = ArgumentInfo::new(argument_name(usage), 1);
    arg.required = min_args > 0;
    arg.min_args = min_args;
    arg.max_args = max_args;
    vec![arg]
}

/// Returns the first token after the command name in a usage line.
///
/// The token is kept as written, brackets included.
pub fn argument_name(usage: &str) -> &str {
    usage
        .split_whitespace()
        .nth(1)
        .unwrap_or(DEFAULT_ARGUMENT_NAME)
}
