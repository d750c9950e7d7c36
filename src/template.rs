use std::fmt::Write;

use crate::error::TemplateError;

/// A positional argument for [`render`].
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Text(&'a str),
    Number(f32),
}

/// Render a user-supplied format string with positional placeholders.
///
/// Supports `{N}`, `{N:.P}` (precision, numbers only) and the `{{` / `}}`
/// escapes. Numbers without a precision print in their shortest form, so
/// `40.0` renders as `40`.
pub fn render(format: &str, args: &[Arg<'_>]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(format.len() + 32);
    let mut rest = format;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            advance(&mut rest, &mut offset, pos + 2);
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            advance(&mut rest, &mut offset, pos + 2);
            continue;
        }
        if tail.starts_with('}') {
            return Err(TemplateError::UnmatchedBrace(at));
        }

        let close = tail.find('}').ok_or(TemplateError::UnclosedBrace(at))?;
        write_placeholder(&mut out, &tail[1..close], args)?;
        advance(&mut rest, &mut offset, pos + close + 1);
    }
    out.push_str(rest);
    Ok(out)
}

fn advance(rest: &mut &str, offset: &mut usize, by: usize) {
    *rest = &rest[by..];
    *offset += by;
}

fn write_placeholder(
    out: &mut String,
    placeholder: &str,
    args: &[Arg<'_>],
) -> Result<(), TemplateError> {
    let invalid = || TemplateError::InvalidPlaceholder(placeholder.to_string());

    let (index, precision) = match placeholder.split_once(':') {
        Some((index, format)) => {
            let digits = format.strip_prefix('.').ok_or_else(invalid)?;
            // The formatter only accepts precisions that fit in a u16.
            let precision: u16 = digits.parse().map_err(|_| invalid())?;
            (index, Some(usize::from(precision)))
        }
        None => (placeholder, None),
    };
    let index: usize = index.trim().parse().map_err(|_| invalid())?;
    let arg = args.get(index).ok_or(TemplateError::IndexOutOfRange {
        index,
        count: args.len(),
    })?;

    match (arg, precision) {
        (Arg::Text(s), None) => out.push_str(s),
        (Arg::Number(n), None) => write!(out, "{n}").map_err(|_| invalid())?,
        (Arg::Number(n), Some(p)) => write!(out, "{n:.p$}").map_err(|_| invalid())?,
        (Arg::Text(_), Some(_)) => return Err(invalid()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let out = render(
            "{0} ({1} {3}: {2})",
            &[
                Arg::Text("Let me through."),
                Arg::Text("Persuade"),
                Arg::Text("Failure"),
                Arg::Number(40.0),
            ],
        )
        .unwrap();
        assert_eq!(out, "Let me through. (Persuade 40: Failure)");
    }

    #[test]
    fn test_reuse_and_skip_arguments() {
        let out = render("{1}{1}", &[Arg::Text("a"), Arg::Text("b")]).unwrap();
        assert_eq!(out, "bb");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(render("{0}", &[Arg::Number(42.5)]).unwrap(), "42.5");
        assert_eq!(render("{0:.0}", &[Arg::Number(42.4)]).unwrap(), "42");
        assert_eq!(render("{0:.2}", &[Arg::Number(3.0)]).unwrap(), "3.00");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(render("{{{0}}}", &[Arg::Text("x")]).unwrap(), "{x}");
        assert_eq!(render("no placeholders", &[]).unwrap(), "no placeholders");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            render("{0} ({1} Level {3}", &[Arg::Text("a")]),
            Err(TemplateError::IndexOutOfRange { index: 1, count: 1 })
        );
        assert_eq!(render("abc {0", &[]), Err(TemplateError::UnclosedBrace(4)));
        assert_eq!(render("a } b", &[]), Err(TemplateError::UnmatchedBrace(2)));
        assert_eq!(
            render("{name}", &[]),
            Err(TemplateError::InvalidPlaceholder("name".into()))
        );
        assert_eq!(
            render("{0:.1}", &[Arg::Text("a")]),
            Err(TemplateError::InvalidPlaceholder("0:.1".into()))
        );
    }

    #[test]
    fn test_oversized_precision_is_rejected() {
        assert_eq!(
            render("{0:.70000}", &[Arg::Number(1.0)]),
            Err(TemplateError::InvalidPlaceholder("0:.70000".into()))
        );
        assert_eq!(render("{0:.3}", &[Arg::Number(1.0)]).unwrap(), "1.000");
    }

    #[test]
    fn test_non_ascii_text_around_placeholders() {
        let out = render("«{0}» - {1}", &[Arg::Text("Überzeugen"), Arg::Number(1.0)]).unwrap();
        assert_eq!(out, "«Überzeugen» - 1");
    }
}
