use super::{Step, IN_TOKEN, OUT_TOKEN};

/** Expands every argument template of `step` into one flat argument vector
 *
 * # Expansion Rules
 * - Literal characters accumulate into a pending element
 * - Whitespace ends the pending element; empty elements are dropped
 * - [`IN_TOKEN`] emits one element per command-line input, in declaration order
 * - [`OUT_TOKEN`] emits the output path as one element
 *
 * Tokens always produce standalone elements. A literal directly adjacent to a
 * token is flushed as its own element: `"-o"` + `T_OUT` gives `["-o", "out"]`.
 * There is no quoting; a literal space cannot be part of an element.
 *
 * The command itself is not included, see [`command_line`].
 */
pub fn expand_arguments(step: &Step) -> Vec<String> {
    let mut argv = Vec::new();
    for template in step.arguments() {
        expand_template(step, template, &mut argv);
    }
    argv
}

/// The command followed by [`expand_arguments`].
pub fn command_line(step: &Step) -> Vec<String> {
    let mut argv = vec![step.command().to_string()];
    argv.extend(expand_arguments(step));
    argv
}

fn expand_template(step: &Step, template: &str, argv: &mut Vec<String>) {
    let mut pending = String::new();

    for c in template.chars() {
        if c == IN_TOKEN {
            flush(&mut pending, argv);
            argv.extend(step.command_line_inputs().map(|p| p.to_string()));
        } else if c == OUT_TOKEN {
            flush(&mut pending, argv);
            argv.push(step.output().to_string());
        } else if c.is_whitespace() {
            flush(&mut pending, argv);
        } else {
            pending.push(c);
        }
    }

    flush(&mut pending, argv);
}

fn flush(pending: &mut String, argv: &mut Vec<String>) {
    if !pending.is_empty() {
        argv.push(std::mem::take(pending));
    }
}
