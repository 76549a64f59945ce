use dice_expr::{ExpressionCache, Outcome, RollContext, RollError, Roller};
use std::io::{self, BufRead, Write};

fn main() {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut ctx = RollContext::default();
    let status = run(stdin.lock(), &mut stdout.lock(), &mut stderr.lock(), &mut ctx);
    if status.is_err() {
        std::process::exit(1);
    }
}

/// Rolls each line of `input`; a blank line rolls the previous expression again.
///
/// Roll errors are reported on `errors` and the session goes on. A line that cannot be
/// read is reported too, and ends the session.
fn run<R: Roller>(
    input: impl BufRead,
    output: &mut impl Write,
    errors: &mut impl Write,
    ctx: &mut RollContext<R>,
) -> io::Result<()> {
    let mut cache = ExpressionCache::new();
    let mut previous = String::new();
    write!(output, "> ")?;
    output.flush()?;
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(why) => {
                writeln!(errors, "Could not read input: {}", why)?;
                return Err(why);
            }
        };
        if !line.trim().is_empty() {
            previous = line;
        }
        if !previous.is_empty() {
            match roll(&mut cache, ctx, &previous) {
                Ok((text, Outcome::Critical)) => writeln!(output, "{}  (critical)", text)?,
                Ok((text, Outcome::Fail)) => writeln!(output, "{}  (fail)", text)?,
                Ok((text, Outcome::Normal)) => writeln!(output, "{}", text)?,
                Err(why) => writeln!(errors, "{}", why)?,
            }
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    Ok(())
}

fn roll<R: Roller>(
    cache: &mut ExpressionCache,
    ctx: &mut RollContext<R>,
    expression: &str,
) -> Result<(String, Outcome), RollError> {
    let tree = cache.get_or_compile(expression)?;
    tree.evaluate(ctx)?;
    let roll = tree.last_roll().ok_or(dice_expr::EvaluationError::NotEvaluated)?;
    Ok((roll.verbose_result(), roll.outcome()))
}
