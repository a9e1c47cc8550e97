use super::*;

fn data(pairs: &[(&str, &str)]) -> DataRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn eval_src(src: &str, d: &DataRecord) -> bool {
    Condition::parse(src).unwrap().evaluate(d)
}

#[test]
fn equality_with_bare_and_quoted_literals() {
    let d = data(&[("severity", "CRITICAL")]);
    assert!(eval_src("severity == CRITICAL", &d));
    assert!(eval_src("severity == 'CRITICAL'", &d));
    assert!(eval_src(r#"severity != "HIGH""#, &d));
    assert!(!eval_src("severity == HIGH", &d));
}

#[test]
fn membership_and_boolean_operators() {
    let d = data(&[("severity", "HIGH"), ("muted", "")]);
    assert!(eval_src("severity in [HIGH, CRITICAL]", &d));
    assert!(eval_src("severity in [CRITICAL, HIGH,]", &d));
    assert!(!eval_src("severity in []", &d));
    assert!(eval_src("severity in [HIGH] && !muted", &d));
    assert!(eval_src("severity == LOW or severity == HIGH", &d));
    assert!(eval_src("not (severity == LOW and muted)", &d));
}

#[test]
fn bare_field_is_truthy_when_non_empty() {
    let d = data(&[("cve", "CVE-2024-1"), ("empty", "")]);
    assert!(eval_src("cve", &d));
    assert!(!eval_src("empty", &d));
    assert!(!eval_src("absent", &d));
}

#[test]
fn precedence_and_binds_tighter_than_or() {
    let d = data(&[("a", "1"), ("b", ""), ("c", "")]);
    // a || (b && c)
    assert!(eval_src("a || b && c", &d));
    assert!(!eval_src("(a || b) && c", &d));
}

#[test]
fn literals_with_unicode_and_escapes() {
    let d = data(&[("lang", "日本語"), ("quote", "it's")]);
    assert!(eval_src("lang == 日本語", &d));
    assert!(eval_src(r"quote == 'it\'s'", &d));
}

#[test]
fn malformed_conditions_report_offsets() {
    for src in ["", "severity ==", "severity = HIGH", "(a", "a in [b", "'open", "== x", "a b"] {
        let err = Condition::parse(src).unwrap_err();
        assert!(matches!(err, ThumbError::Condition(_)), "{src}: {err}");
    }
    let err = Condition::parse("a && )").unwrap_err().to_string();
    assert!(err.contains("at byte 5"), "{err}");
}

#[test]
fn source_is_preserved() {
    let c = Condition::parse("x == y").unwrap();
    assert_eq!(c.source(), "x == y");
}

#[test]
fn nesting_is_capped() {
    let ok = format!("{}x", "!".repeat(MAX_NESTING));
    assert!(Condition::parse(&ok).is_ok());

    for src in [
        format!("{}x", "!".repeat(500_000)),
        format!("{}x{}", "(".repeat(500_000), ")".repeat(500_000)),
        format!("{}x", "not ".repeat(MAX_NESTING + 1)),
    ] {
        let err = Condition::parse(&src).unwrap_err();
        assert!(err.to_string().contains("nests deeper"), "{err}");
    }
}

#[test]
fn long_flat_chains_evaluate() {
    let d = data(&[("a", "1")]);
    let all = vec!["a"; 100_000].join(" && ");
    assert!(eval_src(&all, &d));
    let any = format!("{} || a", vec!["b"; 100_000].join(" || "));
    assert!(eval_src(&any, &d));
}
