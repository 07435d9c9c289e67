use decgen_test::test::{Parser, Runner, Test};

const PREFIXES: &[&str] = &["lo[", "hi[", "-", "error:"];

#[test]
fn parse_flags() {
    let src = " +a\t+b  -abc-foo -foo  +bar+foo";
    let mut flags = decgen_test::test::parse_flags(src);
    assert_eq!(flags.next(), Some(("a", true)));
    assert_eq!(flags.next(), Some(("b", true)));
    assert_eq!(flags.next(), Some(("abc-foo", false)));
    assert_eq!(flags.next(), Some(("foo", false)));
    assert_eq!(flags.next(), Some(("bar+foo", true)));
    assert_eq!(flags.next(), None);
}

#[test]
fn parse() -> Result<(), String> {
    let src = r#"# comment
        0001xxxxxxxxxxxx                    lo[15:12] == 0b0001

        11110xxxxxxxxxxx x0xxxxxxxxxxxxxx   lo[15:11] == 0b11110; hi[14] == 0b0
        1xxxxxxxxxxxxxxx   hi[15] == 0b1  # +hi
        xxxxxxxxxxxxxxxx   -
        0001                error: expected 16 characters, found 4
    "#;

    let mut parser = Parser::new("input", src, PREFIXES);
    let mut test = Test::default();

    assert!(parser.parse(&mut test)?);
    assert_eq!(test.line, 2);
    assert_eq!(test.input, ["0001xxxxxxxxxxxx"]);
    assert_eq!(test.expect, "lo[15:12] == 0b0001");
    assert_eq!(test.comment, "");

    assert!(parser.parse(&mut test)?);
    assert_eq!(test.line, 4);
    assert_eq!(test.input, ["11110xxxxxxxxxxx", "x0xxxxxxxxxxxxxx"]);
    assert_eq!(test.expect, "lo[15:11] == 0b11110; hi[14] == 0b0");

    assert!(parser.parse(&mut test)?);
    assert_eq!(test.input, ["1xxxxxxxxxxxxxxx"]);
    assert_eq!(test.expect, "hi[15] == 0b1");
    assert_eq!(test.comment, "+hi");

    assert!(parser.parse(&mut test)?);
    assert_eq!(test.expect, "-");

    assert!(parser.parse(&mut test)?);
    assert_eq!(test.input, ["0001"]);
    assert_eq!(test.expect, "error: expected 16 characters, found 4");

    assert!(!parser.parse(&mut test)?);

    Ok(())
}

#[test]
fn missing_expect() {
    let mut parser = Parser::new("input", "0001xxxxxxxxxxxx\n", PREFIXES);
    let mut test = Test::default();
    let err = parser.parse(&mut test).unwrap_err();
    assert_eq!(err, "error: no expected result, input:1");
}

struct Echo;

impl Runner for Echo {
    fn expect_prefixes(&self) -> &'static [&'static str] {
        &["="]
    }

    fn exec(&mut self, test: &Test) -> String {
        format!("= {}", test.input.join(" "))
    }
}

#[test]
fn runner() {
    assert_eq!(Echo.run("echo", "a b   =   a  b\nc = c\n"), Ok(()));
    assert_eq!(
        Echo.run("echo", "a = b\nc = c\n"),
        Err("failed 1 tests".to_owned())
    );
    assert_eq!(Echo.run("echo", "# empty\n"), Err("no tests in echo".to_owned()));
}
